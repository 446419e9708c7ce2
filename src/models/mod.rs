//! Models contains all structures that are used in different
//! modules of the app

pub mod authorization;
pub mod category;
pub mod company;
pub mod membership;
pub mod pagination;
pub mod product;
pub mod rfq;
pub mod status;
pub mod user;
pub mod user_role;
pub mod validation_rules;

pub use self::authorization::*;
pub use self::category::*;
pub use self::company::*;
pub use self::membership::*;
pub use self::pagination::*;
pub use self::product::*;
pub use self::rfq::*;
pub use self::status::*;
pub use self::user::*;
pub use self::user_role::*;
pub use self::validation_rules::*;
