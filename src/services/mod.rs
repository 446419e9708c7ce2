//! Services is a core layer for the app business logic like
//! validation, authorization, etc.

pub mod categories;
pub mod companies;
pub mod membership;
pub mod products;
pub mod rfqs;
pub mod types;
pub mod users;

pub use self::categories::*;
pub use self::companies::*;
pub use self::membership::*;
pub use self::products::*;
pub use self::rfqs::*;
pub use self::types::*;
pub use self::users::*;
