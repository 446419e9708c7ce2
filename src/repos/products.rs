//! Products repo, presents CRUD operations with db for products
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{InsertProduct, Product, ProductStatus, ProductsSearchFilters, UpdateProduct};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::companies::dsl as Companies;
use schema::products::dsl::*;
use schema::users::dsl as Users;

/// Products repository, responsible for handling products
pub struct ProductsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Product>>,
}

pub trait ProductsRepo {
    /// Find specific product by ID
    fn find(&self, product_id: i32) -> RepoResult<Option<Product>>;

    /// Returns one page of active products matching `filters`, newest first
    fn search(&self, filters: ProductsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Product>>;

    /// Counts active products matching `filters`
    fn count(&self, filters: ProductsSearchFilters) -> RepoResult<i64>;

    /// Creates new product
    fn create(&self, payload: InsertProduct) -> RepoResult<Product>;

    /// Updates specific product
    fn update(&self, product_id: i32, payload: UpdateProduct) -> RepoResult<Product>;

    /// Deactivates specific product
    fn deactivate(&self, product_id: i32) -> RepoResult<Product>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProductsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Product>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }

    /// Translates the optional filter clauses into one AND-composed predicate
    /// on top of the fixed `status = active` baseline. Shared by `search` and
    /// `count` so both always agree on the predicate.
    fn filtered_query(filters: ProductsSearchFilters) -> ::schema::products::BoxedQuery<'a, Pg> {
        let mut query = products.filter(status.eq(ProductStatus::Active)).into_boxed();

        if let Some(term) = filters.term {
            let pattern = format!("%{}%", term);
            query = query.filter(
                name.ilike(pattern.clone())
                    .or(description.ilike(pattern.clone()))
                    .or(short_description.ilike(pattern)),
            );
        }

        if let Some(category_ids) = filters.category_ids {
            query = query.filter(category_id.eq_any(category_ids));
        }

        if let Some(range) = filters.price_range {
            if let Some(min_value) = range.min_value {
                query = query.filter(price_amount.ge(min_value));
            }
            if let Some(max_value) = range.max_value {
                query = query.filter(price_amount.le(max_value));
            }
        }

        if let Some(company_id_arg) = filters.company_id {
            query = query.filter(company_id.eq(company_id_arg));
        }

        if filters.verified_only {
            let verified_companies = Companies::companies.filter(Companies::verified.eq(true)).select(Companies::id);
            query = query.filter(company_id.eq_any(verified_companies));
        }

        if filters.gold_supplier_only {
            let gold_companies = Companies::companies.filter(Companies::gold_supplier.eq(true)).select(Companies::id);
            query = query.filter(company_id.eq_any(gold_companies));
        }

        if let Some(tier) = filters.membership_tier {
            let tier_companies = Companies::companies.filter(Companies::membership_tier.eq(tier)).select(Companies::id);
            query = query.filter(company_id.eq_any(tier_companies));
        }

        query
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ProductsRepo for ProductsRepoImpl<'a, T> {
    /// Find specific product by ID
    fn find(&self, product_id_arg: i32) -> RepoResult<Option<Product>> {
        debug!("Find in products with id {}.", product_id_arg);
        let query = products.find(product_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|product: Option<Product>| {
                if let Some(ref product) = product {
                    acl::check(&*self.acl, Resource::Products, Action::Read, self, Some(product))?;
                };
                Ok(product)
            })
            .map_err(|e: FailureError| e.context(format!("Find product with id: {} error occured", product_id_arg)).into())
    }

    /// Returns one page of active products matching `filters`, newest first
    fn search(&self, filters: ProductsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Product>> {
        debug!("Search in products with filters {:?}, skip {}, count {}.", filters, skip, count);
        let query = Self::filtered_query(filters.clone())
            .order((created_at.desc(), id.desc()))
            .offset(skip)
            .limit(count);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|products_res: Vec<Product>| {
                for product in &products_res {
                    acl::check(&*self.acl, Resource::Products, Action::Read, self, Some(product))?;
                }
                Ok(products_res.clone())
            })
            .map_err(|e: FailureError| {
                e.context(format!("Search in products with filters {:?} error occured.", filters))
                    .into()
            })
    }

    /// Counts active products matching `filters`
    fn count(&self, filters: ProductsSearchFilters) -> RepoResult<i64> {
        debug!("Count products with filters {:?}.", filters);
        let query = Self::filtered_query(filters.clone()).count();

        query
            .get_result(self.db_conn)
            .map_err(From::from)
            .and_then(|total: i64| {
                acl::check(&*self.acl, Resource::Products, Action::Read, self, None)?;
                Ok(total)
            })
            .map_err(|e: FailureError| e.context(format!("Count products with filters {:?} error occured.", filters)).into())
    }

    /// Creates new product
    fn create(&self, payload: InsertProduct) -> RepoResult<Product> {
        debug!("Create product {:?}.", payload);
        let query_product = diesel::insert_into(products).values(&payload);
        query_product
            .get_result::<Product>(self.db_conn)
            .map_err(From::from)
            .and_then(|product| {
                acl::check(&*self.acl, Resource::Products, Action::Create, self, Some(&product)).and_then(|_| Ok(product))
            })
            .map_err(|e: FailureError| e.context(format!("Create product {:?} error occured.", payload)).into())
    }

    /// Updates specific product
    fn update(&self, product_id_arg: i32, payload: UpdateProduct) -> RepoResult<Product> {
        debug!("Updating product with id {} and payload {:?}.", product_id_arg, payload);
        self.execute_query(products.find(product_id_arg))
            .and_then(|product: Product| acl::check(&*self.acl, Resource::Products, Action::Update, self, Some(&product)))
            .and_then(|_| {
                let filter = products.filter(id.eq(product_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<Product>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating product with id {} and payload {:?} error occured.",
                    product_id_arg, payload
                ))
                .into()
            })
    }

    /// Deactivates specific product
    fn deactivate(&self, product_id_arg: i32) -> RepoResult<Product> {
        debug!("Deactivate product with id {}.", product_id_arg);
        self.execute_query(products.find(product_id_arg))
            .and_then(|product: Product| acl::check(&*self.acl, Resource::Products, Action::Delete, self, Some(&product)))
            .and_then(|_| {
                let filter = products.filter(id.eq(product_id_arg)).filter(status.ne(ProductStatus::Inactive));
                let query = diesel::update(filter).set(status.eq(ProductStatus::Inactive));
                self.execute_query(query)
            })
            .map_err(|e: FailureError| e.context(format!("Deactivate product with id {} error occured.", product_id_arg)).into())
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Product>
    for ProductsRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&Product>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(product) = obj {
                    Users::users
                        .filter(Users::id.eq(user_id_arg))
                        .select(Users::company_id)
                        .get_result::<Option<i32>>(self.db_conn)
                        .ok()
                        .and_then(|user_company_id| user_company_id)
                        .map(|user_company_id| user_company_id == product.company_id)
                        .unwrap_or(false)
                } else {
                    false
                }
            }
        }
    }
}
