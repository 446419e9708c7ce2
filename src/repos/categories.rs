//! Categories repo, presents tree reads and CRUD operations with db for categories
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{Category, NewCategory, RawCategory, UpdateCategory};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::categories::dsl::*;

/// Categories repository, responsible for handling categories
pub struct CategoriesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<RawCategory>>,
}

pub trait CategoriesRepo {
    /// Find specific category by id
    fn find(&self, category_id: i32) -> RepoResult<Option<RawCategory>>;

    /// Find categories by IDs
    fn find_many(&self, category_ids: Vec<i32>) -> RepoResult<Vec<RawCategory>>;

    /// Find categories whose slug equals `value`, or whose id equals `value`
    /// when it parses as an integer. Callers do not need to know which form
    /// they hold; an unmatched value simply yields no rows.
    fn find_by_slug_or_id(&self, value: &str) -> RepoResult<Vec<RawCategory>>;

    /// Returns all categories as a tree of root categories with children
    fn get_all(&self) -> RepoResult<Vec<Category>>;

    /// Creates new category
    fn create(&self, payload: NewCategory) -> RepoResult<RawCategory>;

    /// Updates specific category
    fn update(&self, category_id: i32, payload: UpdateCategory) -> RepoResult<RawCategory>;

    /// Adds `delta` to the denormalized product count of a category
    fn update_product_count(&self, category_id: i32, delta: i32) -> RepoResult<()>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<RawCategory>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CategoriesRepo for CategoriesRepoImpl<'a, T> {
    /// Find specific category by id
    fn find(&self, category_id_arg: i32) -> RepoResult<Option<RawCategory>> {
        debug!("Find in categories with id {}.", category_id_arg);
        let query = categories.find(category_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|category: Option<RawCategory>| {
                if let Some(ref category) = category {
                    acl::check(&*self.acl, Resource::Categories, Action::Read, self, Some(category))?;
                };
                Ok(category)
            })
            .map_err(|e: FailureError| e.context(format!("Find category with id: {} error occured", category_id_arg)).into())
    }

    /// Find categories by IDs
    fn find_many(&self, category_ids: Vec<i32>) -> RepoResult<Vec<RawCategory>> {
        debug!("Find in categories {:?}.", category_ids);
        let query = categories.filter(id.eq_any(category_ids.clone())).order(id);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|categories_res: Vec<RawCategory>| {
                for category in &categories_res {
                    acl::check(&*self.acl, Resource::Categories, Action::Read, self, Some(category))?;
                }
                Ok(categories_res.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Find in categories {:?} error occured.", category_ids)).into())
    }

    /// Find categories whose slug or id equals `value`
    fn find_by_slug_or_id(&self, value: &str) -> RepoResult<Vec<RawCategory>> {
        debug!("Find in categories with slug or id {}.", value);
        let query = match value.parse::<i32>() {
            Ok(id_value) => categories.filter(slug.eq(value.to_string()).or(id.eq(id_value))).into_boxed(),
            Err(_) => categories.filter(slug.eq(value.to_string())).into_boxed(),
        };

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|categories_res: Vec<RawCategory>| {
                for category in &categories_res {
                    acl::check(&*self.acl, Resource::Categories, Action::Read, self, Some(category))?;
                }
                Ok(categories_res.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Find in categories with slug or id {} error occured.", value)).into())
    }

    /// Returns all categories as a tree of root categories with children
    fn get_all(&self) -> RepoResult<Vec<Category>> {
        debug!("Get all categories.");
        acl::check(&*self.acl, Resource::Categories, Action::Read, self, None)
            .and_then(|_| {
                categories
                    .order((level, ordering))
                    .load::<RawCategory>(self.db_conn)
                    .map_err(From::from)
            })
            .and_then(|cats| Ok(create_tree(&cats, None)))
            .map_err(|e: FailureError| e.context("Get all categories error occured.").into())
    }

    /// Creates new category
    fn create(&self, payload: NewCategory) -> RepoResult<RawCategory> {
        debug!("Create new category {:?}.", payload);
        acl::check(&*self.acl, Resource::Categories, Action::Create, self, None)
            .and_then(|_| {
                let query_category = diesel::insert_into(categories).values(&payload);
                query_category.get_result::<RawCategory>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| e.context(format!("Create new category {:?} error occured.", payload)).into())
    }

    /// Updates specific category
    fn update(&self, category_id_arg: i32, payload: UpdateCategory) -> RepoResult<RawCategory> {
        debug!("Updating category with id {} and payload {:?}.", category_id_arg, payload);
        self.execute_query(categories.find(category_id_arg))
            .and_then(|category: RawCategory| acl::check(&*self.acl, Resource::Categories, Action::Update, self, Some(&category)))
            .and_then(|_| {
                let filter = categories.filter(id.eq(category_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<RawCategory>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating category with id {} and payload {:?} error occured.",
                    category_id_arg, payload
                ))
                .into()
            })
    }

    /// Adds `delta` to the denormalized product count of a category
    fn update_product_count(&self, category_id_arg: i32, delta: i32) -> RepoResult<()> {
        debug!("Updating product count of category {} by {}.", category_id_arg, delta);
        let filter = categories.filter(id.eq(category_id_arg));
        diesel::update(filter)
            .set(product_count.eq(product_count + delta))
            .execute(self.db_conn)
            .map(|_| ())
            .map_err(|e| {
                FailureError::from(e)
                    .context(format!(
                        "Updating product count of category {} by {} error occured.",
                        category_id_arg, delta
                    ))
                    .into()
            })
    }
}

/// Builds the subtree of categories whose parent is `parent_id_arg`
pub fn create_tree(cats: &[RawCategory], parent_id_arg: Option<i32>) -> Vec<Category> {
    let mut branch = cats
        .iter()
        .filter(|cat| cat.parent_id == parent_id_arg)
        .map(|cat| {
            let mut category: Category = cat.into();
            category.children = create_tree(cats, Some(cat.id));
            category
        })
        .collect::<Vec<Category>>();
    branch.sort_by_key(|cat| cat.ordering);
    branch
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, RawCategory>
    for CategoriesRepoImpl<'a, T>
{
    fn is_in_scope(&self, _user_id_arg: i32, scope: &Scope, _obj: Option<&RawCategory>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => false,
        }
    }
}
