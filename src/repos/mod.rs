//! Repos is a module responsible for interacting with postgres db

#[macro_use]
pub mod acl;
pub mod categories;
pub mod companies;
pub mod membership_applications;
pub mod products;
pub mod repo_factory;
pub mod rfq_responses;
pub mod rfqs;
pub mod types;
pub mod users;

pub use self::acl::legacy_acl;
pub use self::acl::*;
pub use self::categories::*;
pub use self::companies::*;
pub use self::membership_applications::*;
pub use self::products::*;
pub use self::repo_factory::*;
pub use self::rfq_responses::*;
pub use self::rfqs::*;
pub use self::types::*;
pub use self::users::*;
