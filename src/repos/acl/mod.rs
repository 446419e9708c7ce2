//! Repos is a module responsible for interacting with access control lists
//! Authorization module contains authorization logic for the repo layer app

#[macro_use]
pub mod macros;
pub mod legacy_acl;
pub mod roles_cache;

pub use self::roles_cache::RolesCacheImpl;

use std::collections::HashMap;
use std::rc::Rc;

use failure::Error as FailureError;

use self::legacy_acl::{Acl, CheckScope};

use errors::Error;
use models::authorization::*;
use models::UserRole;

pub fn check<T>(
    acl: &Acl<Resource, Action, Scope, FailureError, T>,
    resource: Resource,
    action: Action,
    scope_checker: &CheckScope<Scope, T>,
    obj: Option<&T>,
) -> Result<(), FailureError> {
    acl.allows(resource, action, scope_checker, obj).and_then(|allowed| {
        if allowed {
            Ok(())
        } else {
            Err(format_err!("Denied request to do {} on {}", action, resource)
                .context(Error::Forbidden)
                .into())
        }
    })
}

/// ApplicationAcl contains main logic for manipulation with resources
#[derive(Clone)]
pub struct ApplicationAcl {
    acls: Rc<HashMap<UserRole, Vec<Permission>>>,
    roles: Vec<UserRole>,
    user_id: i32,
}

impl ApplicationAcl {
    pub fn new(roles: Vec<UserRole>, user_id: i32) -> Self {
        let mut hash = ::std::collections::HashMap::new();
        hash.insert(
            UserRole::Admin,
            vec![
                permission!(Resource::Products),
                permission!(Resource::Companies),
                permission!(Resource::Categories),
                permission!(Resource::CompanyCategories),
                permission!(Resource::Rfqs),
                permission!(Resource::RfqResponses),
                permission!(Resource::MembershipApplications),
                permission!(Resource::Users),
            ],
        );
        hash.insert(
            UserRole::Supplier,
            vec![
                permission!(Resource::Products, Action::Read),
                permission!(Resource::Products, Action::Create, Scope::Owned),
                permission!(Resource::Products, Action::Update, Scope::Owned),
                permission!(Resource::Products, Action::Delete, Scope::Owned),
                permission!(Resource::Companies, Action::Read),
                permission!(Resource::Companies, Action::Create),
                permission!(Resource::Companies, Action::Update, Scope::Owned),
                permission!(Resource::CompanyCategories, Action::Read),
                permission!(Resource::CompanyCategories, Action::Create, Scope::Owned),
                permission!(Resource::Categories, Action::Read),
                permission!(Resource::Rfqs, Action::Read),
                permission!(Resource::RfqResponses, Action::Read),
                permission!(Resource::RfqResponses, Action::Create),
                permission!(Resource::RfqResponses, Action::Update, Scope::Owned),
                permission!(Resource::MembershipApplications, Action::Create),
                permission!(Resource::Users, Action::Read, Scope::Owned),
                permission!(Resource::Users, Action::Update, Scope::Owned),
            ],
        );
        hash.insert(
            UserRole::Buyer,
            vec![
                permission!(Resource::Products, Action::Read),
                permission!(Resource::Companies, Action::Read),
                permission!(Resource::Categories, Action::Read),
                permission!(Resource::Rfqs, Action::Read),
                permission!(Resource::Rfqs, Action::Create),
                permission!(Resource::Rfqs, Action::Update, Scope::Owned),
                permission!(Resource::Rfqs, Action::Delete, Scope::Owned),
                permission!(Resource::RfqResponses, Action::Read),
                permission!(Resource::RfqResponses, Action::Update, Scope::Owned),
                permission!(Resource::MembershipApplications, Action::Create),
                permission!(Resource::Users, Action::Read, Scope::Owned),
            ],
        );

        ApplicationAcl {
            acls: Rc::new(hash),
            roles,
            user_id,
        }
    }
}

impl<T> Acl<Resource, Action, Scope, FailureError, T> for ApplicationAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        let empty: Vec<Permission> = Vec::new();
        let user_id = self.user_id;
        let hashed_acls = self.acls.clone();
        let allowed = self
            .roles
            .iter()
            .flat_map(|role| hashed_acls.get(role).unwrap_or(&empty))
            .filter(|permission| {
                (permission.resource == resource) && ((permission.action == action) || (permission.action == Action::All))
            })
            .any(|permission| scope_checker.is_in_scope(user_id, &permission.scope, obj));

        Ok(allowed)
    }
}

/// UnauthorizedAcl gives read access to public resources only
#[derive(Clone, Default)]
pub struct UnauthorizedAcl;

impl<T> Acl<Resource, Action, Scope, FailureError, T> for UnauthorizedAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        _obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        if action == Action::Read {
            match resource {
                Resource::Products
                | Resource::Companies
                | Resource::Categories
                | Resource::CompanyCategories
                | Resource::Rfqs
                | Resource::RfqResponses => Ok(true),
                _ => Ok(false),
            }
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::legacy_acl::{Acl, CheckScope};
    use super::*;

    struct ScopeMock;

    impl CheckScope<Scope, i32> for ScopeMock {
        fn is_in_scope(&self, user_id: i32, scope: &Scope, obj: Option<&i32>) -> bool {
            match *scope {
                Scope::All => true,
                Scope::Owned => obj.map(|owner| *owner == user_id).unwrap_or(false),
            }
        }
    }

    fn allows<A: Acl<Resource, Action, Scope, FailureError, i32>>(
        acl: &A,
        resource: Resource,
        action: Action,
        obj: Option<&i32>,
    ) -> bool {
        acl.allows(resource, action, &ScopeMock, obj).unwrap()
    }

    #[test]
    fn admin_can_do_everything() {
        let acl = ApplicationAcl::new(vec![UserRole::Admin], 1);
        assert_eq!(allows(&acl, Resource::MembershipApplications, Action::Read, None), true);
        assert_eq!(allows(&acl, Resource::Categories, Action::Delete, None), true);
    }

    #[test]
    fn buyer_cannot_create_products() {
        let acl = ApplicationAcl::new(vec![UserRole::Buyer], 2);
        assert_eq!(allows(&acl, Resource::Products, Action::Create, Some(&2)), false);
    }

    #[test]
    fn supplier_updates_only_owned_products() {
        let acl = ApplicationAcl::new(vec![UserRole::Supplier], 3);
        assert_eq!(allows(&acl, Resource::Products, Action::Update, Some(&3)), true);
        assert_eq!(allows(&acl, Resource::Products, Action::Update, Some(&4)), false);
    }

    #[test]
    fn anonymous_reads_public_resources_only() {
        let acl = UnauthorizedAcl::default();
        assert_eq!(allows(&acl, Resource::Products, Action::Read, None), true);
        assert_eq!(allows(&acl, Resource::Products, Action::Create, None), false);
        assert_eq!(allows(&acl, Resource::MembershipApplications, Action::Read, None), false);
    }
}
