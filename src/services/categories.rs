//! Categories Services, presents the category tree and CRUD operations with categories
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use super::types::ServiceFuture;
use errors::Error;
use models::*;
use repos::ReposFactory;
use services::Service;

pub trait CategoriesService {
    /// Returns all categories as a tree
    fn list_categories(&self) -> ServiceFuture<Vec<Category>>;
    /// Returns category with its subtree by ID
    fn get_category(&self, category_id: i32) -> ServiceFuture<Option<Category>>;
    /// Creates new category
    fn create_category(&self, payload: NewCategory) -> ServiceFuture<RawCategory>;
    /// Updates specific category
    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<RawCategory>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CategoriesService for Service<T, M, F>
{
    /// Returns all categories as a tree
    fn list_categories(&self) -> ServiceFuture<Vec<Category>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
            categories_repo
                .get_all()
                .map_err(|e: FailureError| e.context("Service Categories, list_categories endpoint error occured.").into())
        })
    }

    /// Returns category with its subtree by ID
    fn get_category(&self, category_id: i32) -> ServiceFuture<Option<Category>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                let category = match categories_repo.find(category_id)? {
                    Some(category) => category,
                    None => return Ok(None),
                };

                let subtree = categories_repo.get_all()?;
                Ok(Some(find_in_tree(subtree, category.id).unwrap_or_else(|| category.into())))
            }
            .map_err(|e: FailureError| e.context("Service Categories, get_category endpoint error occured.").into())
        })
    }

    /// Creates new category
    fn create_category(&self, payload: NewCategory) -> ServiceFuture<RawCategory> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                categories_repo.create(payload)
            }
            .map_err(|e: FailureError| e.context("Service Categories, create_category endpoint error occured.").into())
        })
    }

    /// Updates specific category
    fn update_category(&self, category_id: i32, payload: UpdateCategory) -> ServiceFuture<RawCategory> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                categories_repo.update(category_id, payload)
            }
            .map_err(|e: FailureError| e.context("Service Categories, update_category endpoint error occured.").into())
        })
    }
}

/// Finds the node with `category_id` anywhere in the tree
fn find_in_tree(tree: Vec<Category>, category_id: i32) -> Option<Category> {
    for category in tree {
        if category.id == category_id {
            return Some(category);
        }
        if let Some(found) = find_in_tree(category.children.clone(), category_id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use super::*;
    use repos::repo_factory::tests::*;

    #[test]
    fn tree_contains_roots_with_nested_children() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let tree = core.run(service.list_categories()).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].slug, "textiles".to_string());
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].slug, "fabrics".to_string());
    }

    #[test]
    fn subtree_is_returned_for_a_single_category() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let category = core.run(service.get_category(1)).unwrap().unwrap();

        assert_eq!(category.id, 1);
        assert_eq!(category.children.len(), 1);
    }

    #[test]
    fn missing_category_is_none() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let category = core.run(service.get_category(999)).unwrap();
        assert!(category.is_none());
    }
}
