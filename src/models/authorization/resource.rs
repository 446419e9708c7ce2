//! Enum for resources available in ACLs
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resource {
    Products,
    Companies,
    Categories,
    CompanyCategories,
    Rfqs,
    RfqResponses,
    MembershipApplications,
    Users,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Resource::Products => write!(f, "products"),
            Resource::Companies => write!(f, "companies"),
            Resource::Categories => write!(f, "categories"),
            Resource::CompanyCategories => write!(f, "company categories"),
            Resource::Rfqs => write!(f, "rfqs"),
            Resource::RfqResponses => write!(f, "rfq responses"),
            Resource::MembershipApplications => write!(f, "membership applications"),
            Resource::Users => write!(f, "users"),
        }
    }
}
