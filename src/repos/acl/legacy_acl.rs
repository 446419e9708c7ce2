//! Base traits the authorization layer is built from

/// Access control list. Answers whether a `user` may perform `action` on
/// `resource`, consulting the scope checker when a permission is scoped.
pub trait Acl<Resource, Action, Scope, Error, T> {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        obj: Option<&T>,
    ) -> Result<bool, Error>;
}

/// Implemented by repos that know how to decide whether an object lies in a
/// scope for a user, e.g. whether a product belongs to the user's company.
pub trait CheckScope<Scope, T> {
    fn is_in_scope(&self, user_id: i32, scope: &Scope, obj: Option<&T>) -> bool;
}

/// SystemACL allows everything. Used by internal calls that act on behalf of
/// the application itself, e.g. resolving roles for the roles cache.
#[derive(Clone, Debug, Default)]
pub struct SystemACL;

impl<Resource, Action, Scope, Error, T> Acl<Resource, Action, Scope, Error, T> for SystemACL {
    fn allows(
        &self,
        _resource: Resource,
        _action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        _obj: Option<&T>,
    ) -> Result<bool, Error> {
        Ok(true)
    }
}
