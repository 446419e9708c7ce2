//! RolesCache is a module that caches received from db information about user and his roles
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use models::UserRole;

#[derive(Clone, Default)]
pub struct RolesCacheImpl {
    roles_cache: Arc<Mutex<HashMap<i32, Vec<UserRole>>>>,
}

impl RolesCacheImpl {
    pub fn get(&self, user_id: i32) -> Option<Vec<UserRole>> {
        let hash_map = self.roles_cache.lock().unwrap();
        hash_map.get(&user_id).cloned()
    }

    pub fn add_roles(&self, user_id: i32, roles: &[UserRole]) {
        let mut hash_map = self.roles_cache.lock().unwrap();
        hash_map.insert(user_id, roles.to_vec());
    }

    pub fn remove(&self, user_id: i32) {
        let mut hash_map = self.roles_cache.lock().unwrap();
        hash_map.remove(&user_id);
    }

    pub fn clear(&self) {
        let mut hash_map = self.roles_cache.lock().unwrap();
        hash_map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_cached_until_removed() {
        let cache = RolesCacheImpl::default();
        assert_eq!(cache.get(1), None);

        cache.add_roles(1, &[UserRole::Supplier]);
        assert_eq!(cache.get(1), Some(vec![UserRole::Supplier]));

        cache.remove(1);
        assert_eq!(cache.get(1), None);
    }
}
