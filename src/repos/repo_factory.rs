use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;

use models::*;
use repos::legacy_acl::{Acl, SystemACL};
use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_categories_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CategoriesRepo + 'a>;
    fn create_companies_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CompaniesRepo + 'a>;
    fn create_products_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ProductsRepo + 'a>;
    fn create_rfqs_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RfqsRepo + 'a>;
    fn create_rfq_responses_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RfqResponsesRepo + 'a>;
    fn create_membership_applications_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<MembershipApplicationsRepo + 'a>;
    fn create_users_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<UsersRepo + 'a>;
    fn create_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<UsersRepo + 'a>;
}

#[derive(Clone)]
pub struct ReposFactoryImpl {
    roles_cache: RolesCacheImpl,
}

impl ReposFactoryImpl {
    pub fn new(roles_cache: RolesCacheImpl) -> Self {
        Self { roles_cache }
    }

    pub fn get_roles<'a, C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>(
        &self,
        user_id: i32,
        db_conn: &'a C,
    ) -> Vec<UserRole> {
        if let Some(roles) = self.roles_cache.get(user_id) {
            return roles;
        }
        let roles = self
            .create_users_repo_with_sys_acl(db_conn)
            .roles_for_user(user_id)
            .ok()
            .unwrap_or_default();
        self.roles_cache.add_roles(user_id, &roles);
        roles
    }

    fn get_acl<'a, T, C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>(
        &self,
        db_conn: &'a C,
        user_id: Option<i32>,
    ) -> Box<Acl<Resource, Action, Scope, FailureError, T>> {
        user_id.map_or(
            Box::new(UnauthorizedAcl::default()) as Box<Acl<Resource, Action, Scope, FailureError, T>>,
            |id| {
                let roles = self.get_roles(id, db_conn);
                (Box::new(ApplicationAcl::new(roles, id)) as Box<Acl<Resource, Action, Scope, FailureError, T>>)
            },
        )
    }
}

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_categories_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CategoriesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(CategoriesRepoImpl::new(db_conn, acl)) as Box<CategoriesRepo>
    }
    fn create_companies_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<CompaniesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(CompaniesRepoImpl::new(db_conn, acl)) as Box<CompaniesRepo>
    }
    fn create_products_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<ProductsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(ProductsRepoImpl::new(db_conn, acl)) as Box<ProductsRepo>
    }
    fn create_rfqs_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RfqsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(RfqsRepoImpl::new(db_conn, acl)) as Box<RfqsRepo>
    }
    fn create_rfq_responses_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<RfqResponsesRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(RfqResponsesRepoImpl::new(db_conn, acl)) as Box<RfqResponsesRepo>
    }
    fn create_membership_applications_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<MembershipApplicationsRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(MembershipApplicationsRepoImpl::new(db_conn, acl)) as Box<MembershipApplicationsRepo>
    }
    fn create_users_repo<'a>(&self, db_conn: &'a C, user_id: Option<i32>) -> Box<UsersRepo + 'a> {
        let acl = self.get_acl(db_conn, user_id);
        Box::new(UsersRepoImpl::new(db_conn, acl)) as Box<UsersRepo>
    }
    fn create_users_repo_with_sys_acl<'a>(&self, db_conn: &'a C) -> Box<UsersRepo + 'a> {
        Box::new(UsersRepoImpl::new(
            db_conn,
            Box::new(SystemACL::default()) as Box<Acl<Resource, Action, Scope, FailureError, User>>,
        )) as Box<UsersRepo>
    }
}

#[cfg(test)]
pub mod tests {

    use std::error::Error;
    use std::fmt;
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use diesel::connection::AnsiTransactionManager;
    use diesel::connection::SimpleConnection;
    use diesel::deserialize::QueryableByName;
    use diesel::pg::Pg;
    use diesel::query_builder::AsQuery;
    use diesel::query_builder::QueryFragment;
    use diesel::query_builder::QueryId;
    use diesel::sql_types::HasSqlType;
    use diesel::Connection;
    use diesel::ConnectionResult;
    use diesel::QueryResult;
    use diesel::Queryable;
    use futures_cpupool::CpuPool;
    use r2d2;
    use r2d2::ManageConnection;
    use serde_json;

    use config::Config;
    use controller::context::{DynamicContext, StaticContext};
    use models::*;
    use repos::*;
    use services::*;

    pub const MOCK_REPO_FACTORY: ReposFactoryMock = ReposFactoryMock {};
    pub static MOCK_BUYER_ID: i32 = 10;
    pub static MOCK_SUPPLIER_ID: i32 = 11;
    pub static MOCK_ADMIN_ID: i32 = 12;
    pub static MOCK_NEW_SUPPLIER_ID: i32 = 13;
    pub static MOCK_COMPANY_ID: i32 = 1;

    pub fn create_service(user_id: Option<i32>) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        let manager = MockConnectionManager::default();
        let db_pool = r2d2::Pool::builder().build(manager).expect("Failed to create connection pool");
        let cpu_pool = CpuPool::new(1);

        let config = Config::new().unwrap();
        let static_context = StaticContext::new(db_pool, cpu_pool, Arc::new(config), MOCK_REPO_FACTORY);
        let dynamic_context = DynamicContext::new(user_id);

        Service::new(static_context, dynamic_context)
    }

    pub fn mock_time(offset: i64) -> NaiveDateTime {
        NaiveDate::from_ymd(2024, 1, 1).and_hms(0, 0, 0) + Duration::seconds(offset)
    }

    #[derive(Default, Copy, Clone)]
    pub struct ReposFactoryMock;

    impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryMock {
        fn create_categories_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<CategoriesRepo + 'a> {
            Box::new(CategoriesRepoMock::default()) as Box<CategoriesRepo>
        }
        fn create_companies_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<CompaniesRepo + 'a> {
            Box::new(CompaniesRepoMock::default()) as Box<CompaniesRepo>
        }
        fn create_products_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<ProductsRepo + 'a> {
            Box::new(ProductsRepoMock::default()) as Box<ProductsRepo>
        }
        fn create_rfqs_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<RfqsRepo + 'a> {
            Box::new(RfqsRepoMock::default()) as Box<RfqsRepo>
        }
        fn create_rfq_responses_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<RfqResponsesRepo + 'a> {
            Box::new(RfqResponsesRepoMock::default()) as Box<RfqResponsesRepo>
        }
        fn create_membership_applications_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<MembershipApplicationsRepo + 'a> {
            Box::new(MembershipApplicationsRepoMock::default()) as Box<MembershipApplicationsRepo>
        }
        fn create_users_repo<'a>(&self, _db_conn: &'a C, _user_id: Option<i32>) -> Box<UsersRepo + 'a> {
            Box::new(UsersRepoMock::default()) as Box<UsersRepo>
        }
        fn create_users_repo_with_sys_acl<'a>(&self, _db_conn: &'a C) -> Box<UsersRepo + 'a> {
            Box::new(UsersRepoMock::default()) as Box<UsersRepo>
        }
    }

    // ---- categories --------------------------------------------------------

    pub fn create_raw_category(
        category_id: i32,
        name_arg: &str,
        slug_arg: &str,
        parent: Option<i32>,
        level_arg: i32,
        ordering_arg: i32,
    ) -> RawCategory {
        RawCategory {
            id: category_id,
            name: name_arg.to_string(),
            slug: slug_arg.to_string(),
            description: None,
            image: None,
            icon: None,
            parent_id: parent,
            level: level_arg,
            ordering: ordering_arg,
            product_count: 0,
            created_at: mock_time(0),
            updated_at: mock_time(0),
        }
    }

    pub fn mock_categories() -> Vec<RawCategory> {
        vec![
            create_raw_category(1, "Textiles", "textiles", None, 1, 1),
            create_raw_category(2, "Electronics", "electronics", None, 1, 2),
            create_raw_category(3, "Fabrics", "fabrics", Some(1), 2, 1),
        ]
    }

    #[derive(Clone, Default)]
    pub struct CategoriesRepoMock;

    impl CategoriesRepo for CategoriesRepoMock {
        fn find(&self, category_id: i32) -> RepoResult<Option<RawCategory>> {
            Ok(mock_categories().into_iter().find(|cat| cat.id == category_id))
        }

        fn find_many(&self, category_ids: Vec<i32>) -> RepoResult<Vec<RawCategory>> {
            Ok(mock_categories().into_iter().filter(|cat| category_ids.contains(&cat.id)).collect())
        }

        fn find_by_slug_or_id(&self, value: &str) -> RepoResult<Vec<RawCategory>> {
            let id_value = value.parse::<i32>().ok();
            Ok(mock_categories()
                .into_iter()
                .filter(|cat| cat.slug == value || Some(cat.id) == id_value)
                .collect())
        }

        fn get_all(&self) -> RepoResult<Vec<Category>> {
            Ok(create_tree(&mock_categories(), None))
        }

        fn create(&self, payload: NewCategory) -> RepoResult<RawCategory> {
            let mut category = create_raw_category(4, &payload.name, &payload.slug, payload.parent_id, payload.level, payload.ordering);
            category.description = payload.description;
            Ok(category)
        }

        fn update(&self, category_id: i32, payload: UpdateCategory) -> RepoResult<RawCategory> {
            let mut category = mock_categories()
                .into_iter()
                .find(|cat| cat.id == category_id)
                .expect("Unknown mock category");
            if let Some(name_arg) = payload.name {
                category.name = name_arg;
            }
            if let Some(slug_arg) = payload.slug {
                category.slug = slug_arg;
            }
            Ok(category)
        }

        fn update_product_count(&self, _category_id: i32, _delta: i32) -> RepoResult<()> {
            Ok(())
        }
    }

    // ---- companies ---------------------------------------------------------

    pub fn create_company_fixture(company_id: i32) -> Company {
        Company {
            id: company_id,
            name: format!("Supplier {}", company_id),
            description: format!("Trade company number {}", company_id),
            email: format!("supplier{}@example.com", company_id),
            phone: None,
            website: None,
            city: if company_id % 2 == 0 { "Karachi".to_string() } else { "Lahore".to_string() },
            province: if company_id % 2 == 0 { "Sindh".to_string() } else { "Punjab".to_string() },
            country: "Pakistan".to_string(),
            logo: None,
            cover_image: None,
            verified: company_id % 2 == 1,
            gold_supplier: company_id % 5 == 0,
            membership_tier: if company_id % 2 == 1 { Some(MembershipTier::Gold) } else { None },
            trust_score: Some(company_id),
            product_count: 0,
            year_established: None,
            employee_count: None,
            certifications: None,
            main_products: None,
            created_at: mock_time(company_id as i64),
            updated_at: mock_time(company_id as i64),
        }
    }

    pub fn mock_companies() -> Vec<Company> {
        (1..46).map(create_company_fixture).collect()
    }

    fn linked_company_ids(category_ids: &[i32]) -> Vec<i32> {
        // companies divisible by 3 are linked to category 1 in the fixtures
        if category_ids.contains(&1) {
            mock_companies().into_iter().map(|company| company.id).filter(|id| id % 3 == 0).collect()
        } else {
            vec![]
        }
    }

    fn apply_company_filters(filters: &CompaniesSearchFilters, companies: Vec<Company>) -> Vec<Company> {
        companies
            .into_iter()
            .filter(|company| match filters.term {
                Some(ref term) => {
                    let term = term.to_lowercase();
                    company.name.to_lowercase().contains(&term)
                        || company.description.to_lowercase().contains(&term)
                        || company.city.to_lowercase().contains(&term)
                }
                None => true,
            })
            .filter(|company| match filters.category_ids {
                Some(ref category_ids) => linked_company_ids(category_ids).contains(&company.id),
                None => true,
            })
            .filter(|company| match filters.city {
                Some(ref city) => company.city.to_lowercase().contains(&city.to_lowercase()),
                None => true,
            })
            .filter(|company| match filters.province {
                Some(ref province) => company.province.to_lowercase().contains(&province.to_lowercase()),
                None => true,
            })
            .filter(|company| !filters.verified_only || company.verified)
            .filter(|company| !filters.gold_supplier_only || company.gold_supplier)
            .filter(|company| match filters.min_trust_score {
                Some(min) => company.trust_score.map(|score| score >= min).unwrap_or(false),
                None => true,
            })
            .collect()
    }

    fn newest_first<T, F: Fn(&T) -> (NaiveDateTime, i32)>(mut items: Vec<T>, key: F) -> Vec<T> {
        items.sort_by(|a, b| key(b).cmp(&key(a)));
        items
    }

    #[derive(Clone, Default)]
    pub struct CompaniesRepoMock;

    impl CompaniesRepo for CompaniesRepoMock {
        fn find(&self, company_id: i32) -> RepoResult<Option<Company>> {
            Ok(mock_companies().into_iter().find(|company| company.id == company_id))
        }

        fn find_many(&self, company_ids: Vec<i32>) -> RepoResult<Vec<Company>> {
            Ok(mock_companies().into_iter().filter(|company| company_ids.contains(&company.id)).collect())
        }

        fn search(&self, filters: CompaniesSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Company>> {
            let matched = apply_company_filters(&filters, mock_companies());
            let ordered = newest_first(matched, |company| (company.created_at, company.id));
            Ok(ordered.into_iter().skip(skip as usize).take(count as usize).collect())
        }

        fn count(&self, filters: CompaniesSearchFilters) -> RepoResult<i64> {
            Ok(apply_company_filters(&filters, mock_companies()).len() as i64)
        }

        fn email_exists(&self, email_arg: String) -> RepoResult<bool> {
            Ok(mock_companies().into_iter().any(|company| company.email == email_arg))
        }

        fn create(&self, payload: NewCompany) -> RepoResult<Company> {
            let mut company = create_company_fixture(46);
            company.name = payload.name;
            company.description = payload.description;
            company.email = payload.email;
            company.city = payload.city;
            company.province = payload.province;
            company.country = payload.country;
            company.verified = false;
            company.gold_supplier = false;
            company.membership_tier = None;
            company.trust_score = None;
            Ok(company)
        }

        fn update(&self, company_id: i32, payload: UpdateCompany) -> RepoResult<Company> {
            let mut company = mock_companies()
                .into_iter()
                .find(|company| company.id == company_id)
                .expect("Unknown mock company");
            if let Some(name_arg) = payload.name {
                company.name = name_arg;
            }
            if let Some(tier) = payload.membership_tier {
                company.membership_tier = Some(tier);
            }
            if let Some(verified_arg) = payload.verified {
                company.verified = verified_arg;
            }
            Ok(company)
        }

        fn update_product_count(&self, _company_id: i32, _delta: i32) -> RepoResult<()> {
            Ok(())
        }

        fn add_category(&self, payload: NewCompanyCategory) -> RepoResult<CompanyCategory> {
            Ok(CompanyCategory {
                id: 1,
                company_id: payload.company_id,
                category_id: payload.category_id,
            })
        }

        fn category_links(&self, company_ids: Vec<i32>) -> RepoResult<Vec<(CompanyCategory, RawCategory)>> {
            let category = mock_categories().remove(0);
            Ok(company_ids
                .into_iter()
                .filter(|company_id| company_id % 3 == 0)
                .enumerate()
                .map(|(i, company_id)| {
                    (
                        CompanyCategory {
                            id: i as i32 + 1,
                            company_id,
                            category_id: category.id,
                        },
                        category.clone(),
                    )
                })
                .collect())
        }
    }

    // ---- products ----------------------------------------------------------

    pub fn create_product_fixture(product_id: i32) -> Product {
        let name_arg = if product_id <= 3 {
            format!("Cotton shirt {}", product_id)
        } else {
            format!("Plastic bucket {}", product_id)
        };
        let tags = if product_id % 10 == 0 {
            Some(serde_json::to_value(vec!["wholesale"]).unwrap())
        } else if product_id % 2 == 0 {
            Some(serde_json::to_value(vec!["bulk"]).unwrap())
        } else {
            None
        };
        Product {
            id: product_id,
            company_id: if product_id % 2 == 1 { 1 } else { 2 },
            category_id: if product_id % 3 == 0 { 2 } else { 1 },
            name: name_arg,
            description: format!("Factory description {}", product_id),
            short_description: Some(format!("Short description {}", product_id)),
            price_amount: product_id as f64 * 10.0,
            price_currency: "USD".to_string(),
            min_order_quantity: Some(100),
            images: None,
            specifications: None,
            tags,
            status: ProductStatus::Active,
            created_at: mock_time(product_id as i64),
            updated_at: mock_time(product_id as i64),
        }
    }

    /// 25 active products plus two rows that must never surface in listings
    pub fn mock_products() -> Vec<Product> {
        let mut products: Vec<Product> = (1..26).map(create_product_fixture).collect();
        let mut inactive = create_product_fixture(26);
        inactive.status = ProductStatus::Inactive;
        let mut pending = create_product_fixture(27);
        pending.status = ProductStatus::Pending;
        products.push(inactive);
        products.push(pending);
        products
    }

    fn company_ids_where<F: Fn(&Company) -> bool>(pred: F) -> Vec<i32> {
        mock_companies().into_iter().filter(|company| pred(company)).map(|company| company.id).collect()
    }

    fn apply_product_filters(filters: &ProductsSearchFilters, products: Vec<Product>) -> Vec<Product> {
        products
            .into_iter()
            .filter(|product| product.status == ProductStatus::Active)
            .filter(|product| match filters.term {
                Some(ref term) => {
                    let term = term.to_lowercase();
                    product.name.to_lowercase().contains(&term)
                        || product.description.to_lowercase().contains(&term)
                        || product
                            .short_description
                            .as_ref()
                            .map(|short| short.to_lowercase().contains(&term))
                            .unwrap_or(false)
                }
                None => true,
            })
            .filter(|product| match filters.category_ids {
                Some(ref category_ids) => category_ids.contains(&product.category_id),
                None => true,
            })
            .filter(|product| match filters.price_range {
                Some(range) => {
                    range.min_value.map(|min| product.price_amount >= min).unwrap_or(true)
                        && range.max_value.map(|max| product.price_amount <= max).unwrap_or(true)
                }
                None => true,
            })
            .filter(|product| match filters.company_id {
                Some(company_id) => product.company_id == company_id,
                None => true,
            })
            .filter(|product| {
                !filters.verified_only || company_ids_where(|company| company.verified).contains(&product.company_id)
            })
            .filter(|product| {
                !filters.gold_supplier_only || company_ids_where(|company| company.gold_supplier).contains(&product.company_id)
            })
            .filter(|product| match filters.membership_tier {
                Some(tier) => company_ids_where(|company| company.membership_tier == Some(tier)).contains(&product.company_id),
                None => true,
            })
            .collect()
    }

    #[derive(Clone, Default)]
    pub struct ProductsRepoMock;

    impl ProductsRepo for ProductsRepoMock {
        fn find(&self, product_id: i32) -> RepoResult<Option<Product>> {
            Ok(mock_products().into_iter().find(|product| product.id == product_id))
        }

        fn search(&self, filters: ProductsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Product>> {
            let matched = apply_product_filters(&filters, mock_products());
            let ordered = newest_first(matched, |product| (product.created_at, product.id));
            Ok(ordered.into_iter().skip(skip as usize).take(count as usize).collect())
        }

        fn count(&self, filters: ProductsSearchFilters) -> RepoResult<i64> {
            Ok(apply_product_filters(&filters, mock_products()).len() as i64)
        }

        fn create(&self, payload: InsertProduct) -> RepoResult<Product> {
            Ok(Product {
                id: 100,
                company_id: payload.company_id,
                category_id: payload.category_id,
                name: payload.name,
                description: payload.description,
                short_description: payload.short_description,
                price_amount: payload.price_amount,
                price_currency: payload.price_currency,
                min_order_quantity: payload.min_order_quantity,
                images: payload.images,
                specifications: payload.specifications,
                tags: payload.tags,
                status: payload.status,
                created_at: mock_time(100),
                updated_at: mock_time(100),
            })
        }

        fn update(&self, product_id: i32, payload: UpdateProduct) -> RepoResult<Product> {
            let mut product = mock_products()
                .into_iter()
                .find(|product| product.id == product_id)
                .expect("Unknown mock product");
            if let Some(name_arg) = payload.name {
                product.name = name_arg;
            }
            if let Some(status_arg) = payload.status {
                product.status = status_arg;
            }
            Ok(product)
        }

        fn deactivate(&self, product_id: i32) -> RepoResult<Product> {
            let mut product = mock_products()
                .into_iter()
                .find(|product| product.id == product_id)
                .expect("Unknown mock product");
            product.status = ProductStatus::Inactive;
            Ok(product)
        }
    }

    // ---- users -------------------------------------------------------------

    fn create_user_fixture(user_id: i32, email_arg: &str, name_arg: &str, role_arg: UserRole, company: Option<i32>) -> User {
        User {
            id: user_id,
            email: email_arg.to_string(),
            name: name_arg.to_string(),
            role: role_arg,
            company_id: company,
            created_at: mock_time(0),
            updated_at: mock_time(0),
        }
    }

    pub fn mock_users() -> Vec<User> {
        vec![
            create_user_fixture(MOCK_BUYER_ID, "buyer@example.com", "Bilal Buyer", UserRole::Buyer, None),
            create_user_fixture(MOCK_SUPPLIER_ID, "supplier@example.com", "Sana Supplier", UserRole::Supplier, Some(MOCK_COMPANY_ID)),
            create_user_fixture(MOCK_ADMIN_ID, "admin@example.com", "Asad Admin", UserRole::Admin, None),
            create_user_fixture(MOCK_NEW_SUPPLIER_ID, "newsupplier@example.com", "Nadia Supplier", UserRole::Supplier, None),
        ]
    }

    #[derive(Clone, Default)]
    pub struct UsersRepoMock;

    impl UsersRepo for UsersRepoMock {
        fn find(&self, user_id: i32) -> RepoResult<Option<User>> {
            Ok(mock_users().into_iter().find(|user| user.id == user_id))
        }

        fn find_many(&self, user_ids: Vec<i32>) -> RepoResult<Vec<User>> {
            Ok(mock_users().into_iter().filter(|user| user_ids.contains(&user.id)).collect())
        }

        fn roles_for_user(&self, user_id: i32) -> RepoResult<Vec<UserRole>> {
            Ok(mock_users().into_iter().find(|user| user.id == user_id).map(|user| user.role).into_iter().collect())
        }

        fn set_company(&self, user_id: i32, company_id: i32) -> RepoResult<User> {
            let mut user = mock_users().into_iter().find(|user| user.id == user_id).expect("Unknown mock user");
            user.company_id = Some(company_id);
            Ok(user)
        }
    }

    // ---- rfqs --------------------------------------------------------------

    pub fn create_rfq_fixture(rfq_id: i32, status_arg: RfqStatus) -> Rfq {
        Rfq {
            id: rfq_id,
            title: format!("Need quotation {}", rfq_id),
            description: format!("Looking for bulk supply {}", rfq_id),
            buyer_id: MOCK_BUYER_ID,
            category_id: 1,
            quantity_min: Some(100),
            quantity_max: Some(500),
            quantity_unit: Some("pieces".to_string()),
            budget_min: Some(1000.0),
            budget_max: Some(5000.0),
            budget_currency: Some("USD".to_string()),
            specifications: None,
            status: status_arg,
            deadline: None,
            created_at: mock_time(rfq_id as i64),
            updated_at: mock_time(rfq_id as i64),
        }
    }

    pub fn mock_rfqs() -> Vec<Rfq> {
        vec![
            create_rfq_fixture(1, RfqStatus::Open),
            create_rfq_fixture(2, RfqStatus::Open),
            create_rfq_fixture(3, RfqStatus::Closed),
            create_rfq_fixture(4, RfqStatus::Awarded),
            create_rfq_fixture(5, RfqStatus::Cancelled),
        ]
    }

    fn apply_rfq_filters(filters: &RfqsSearchFilters, rfqs: Vec<Rfq>) -> Vec<Rfq> {
        rfqs.into_iter()
            .filter(|rfq| match filters.status {
                Some(status_arg) => rfq.status == status_arg,
                None => true,
            })
            .filter(|rfq| match filters.category_id {
                Some(category_id) => rfq.category_id == category_id,
                None => true,
            })
            .filter(|rfq| match filters.buyer_id {
                Some(buyer_id) => rfq.buyer_id == buyer_id,
                None => true,
            })
            .collect()
    }

    #[derive(Clone, Default)]
    pub struct RfqsRepoMock;

    impl RfqsRepo for RfqsRepoMock {
        fn find(&self, rfq_id: i32) -> RepoResult<Option<Rfq>> {
            Ok(mock_rfqs().into_iter().find(|rfq| rfq.id == rfq_id))
        }

        fn search(&self, filters: RfqsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Rfq>> {
            let matched = apply_rfq_filters(&filters, mock_rfqs());
            let ordered = newest_first(matched, |rfq| (rfq.created_at, rfq.id));
            Ok(ordered.into_iter().skip(skip as usize).take(count as usize).collect())
        }

        fn count(&self, filters: RfqsSearchFilters) -> RepoResult<i64> {
            Ok(apply_rfq_filters(&filters, mock_rfqs()).len() as i64)
        }

        fn create(&self, payload: InsertRfq) -> RepoResult<Rfq> {
            let mut rfq = create_rfq_fixture(6, payload.status);
            rfq.title = payload.title;
            rfq.description = payload.description;
            rfq.buyer_id = payload.buyer_id;
            rfq.category_id = payload.category_id;
            Ok(rfq)
        }

        fn update(&self, rfq_id: i32, payload: UpdateRfq) -> RepoResult<Rfq> {
            let mut rfq = mock_rfqs().into_iter().find(|rfq| rfq.id == rfq_id).expect("Unknown mock rfq");
            if let Some(title_arg) = payload.title {
                rfq.title = title_arg;
            }
            if let Some(status_arg) = payload.status {
                rfq.status = status_arg;
            }
            Ok(rfq)
        }
    }

    // ---- rfq responses -----------------------------------------------------

    pub fn create_rfq_response_fixture(response_id: i32, rfq_id_arg: i32) -> RfqResponse {
        RfqResponse {
            id: response_id,
            rfq_id: rfq_id_arg,
            supplier_id: MOCK_SUPPLIER_ID,
            supplier_company: Some("Supplier 1".to_string()),
            price_amount: 1500.0,
            price_currency: "USD".to_string(),
            message: Some("We can deliver in two weeks".to_string()),
            status: RfqResponseStatus::Pending,
            created_at: mock_time(response_id as i64),
            updated_at: mock_time(response_id as i64),
        }
    }

    #[derive(Clone, Default)]
    pub struct RfqResponsesRepoMock;

    impl RfqResponsesRepo for RfqResponsesRepoMock {
        fn find(&self, response_id: i32) -> RepoResult<Option<RfqResponse>> {
            if response_id == 1 {
                Ok(Some(create_rfq_response_fixture(1, 1)))
            } else {
                Ok(None)
            }
        }

        fn list_for_rfqs(&self, rfq_ids: Vec<i32>) -> RepoResult<Vec<RfqResponse>> {
            if rfq_ids.contains(&1) {
                Ok(vec![create_rfq_response_fixture(1, 1)])
            } else {
                Ok(vec![])
            }
        }

        fn create(&self, payload: InsertRfqResponse) -> RepoResult<RfqResponse> {
            let mut response = create_rfq_response_fixture(2, payload.rfq_id);
            response.supplier_id = payload.supplier_id;
            response.supplier_company = payload.supplier_company;
            response.price_amount = payload.price_amount;
            response.price_currency = payload.price_currency;
            response.message = payload.message;
            response.status = payload.status;
            Ok(response)
        }

        fn update(&self, response_id: i32, payload: UpdateRfqResponse) -> RepoResult<RfqResponse> {
            let mut response = create_rfq_response_fixture(response_id, 1);
            response.status = payload.status;
            Ok(response)
        }
    }

    // ---- membership applications -------------------------------------------

    pub fn create_application_fixture(application_id: i32) -> MembershipApplication {
        MembershipApplication {
            id: application_id,
            user_id: MOCK_BUYER_ID,
            company_name: format!("Company {}", application_id),
            requested_tier: MembershipTier::Gold,
            message: None,
            status: ApplicationStatus::Pending,
            reviewer_id: None,
            reviewed_at: None,
            created_at: mock_time(application_id as i64),
            updated_at: mock_time(application_id as i64),
        }
    }

    pub fn mock_applications() -> Vec<MembershipApplication> {
        (1..4).map(create_application_fixture).collect()
    }

    #[derive(Clone, Default)]
    pub struct MembershipApplicationsRepoMock;

    impl MembershipApplicationsRepo for MembershipApplicationsRepoMock {
        fn find(&self, application_id: i32) -> RepoResult<Option<MembershipApplication>> {
            Ok(mock_applications().into_iter().find(|application| application.id == application_id))
        }

        fn search(&self, filters: ApplicationsSearchTerms, skip: i64, count: i64) -> RepoResult<Vec<MembershipApplication>> {
            let matched: Vec<_> = mock_applications()
                .into_iter()
                .filter(|application| match filters.status {
                    Some(status_arg) => application.status == status_arg,
                    None => true,
                })
                .collect();
            let ordered = newest_first(matched, |application| (application.created_at, application.id));
            Ok(ordered.into_iter().skip(skip as usize).take(count as usize).collect())
        }

        fn count(&self, filters: ApplicationsSearchTerms) -> RepoResult<i64> {
            Ok(mock_applications()
                .into_iter()
                .filter(|application| match filters.status {
                    Some(status_arg) => application.status == status_arg,
                    None => true,
                })
                .count() as i64)
        }

        fn create(&self, payload: NewMembershipApplication) -> RepoResult<MembershipApplication> {
            let mut application = create_application_fixture(4);
            application.user_id = payload.user_id;
            application.company_name = payload.company_name;
            application.requested_tier = payload.requested_tier;
            application.message = payload.message;
            Ok(application)
        }

        fn review(&self, application_id: i32, payload: ReviewedApplication) -> RepoResult<MembershipApplication> {
            let mut application = mock_applications()
                .into_iter()
                .find(|application| application.id == application_id)
                .expect("Unknown mock application");
            application.status = payload.status;
            application.reviewer_id = Some(payload.reviewer_id);
            application.reviewed_at = Some(payload.reviewed_at);
            Ok(application)
        }
    }

    // ---- mock connection ---------------------------------------------------

    #[derive(Default)]
    pub struct MockConnection {
        tr: AnsiTransactionManager,
    }

    impl Connection for MockConnection {
        type Backend = Pg;
        type TransactionManager = AnsiTransactionManager;

        fn establish(_database_url: &str) -> ConnectionResult<MockConnection> {
            Ok(MockConnection::default())
        }

        fn execute(&self, _query: &str) -> QueryResult<usize> {
            unimplemented!()
        }

        fn query_by_index<T, U>(&self, _source: T) -> QueryResult<Vec<U>>
        where
            T: AsQuery,
            T::Query: QueryFragment<Pg> + QueryId,
            Pg: HasSqlType<T::SqlType>,
            U: Queryable<T::SqlType, Pg>,
        {
            unimplemented!()
        }

        fn query_by_name<T, U>(&self, _source: &T) -> QueryResult<Vec<U>>
        where
            T: QueryFragment<Pg> + QueryId,
            U: QueryableByName<Pg>,
        {
            unimplemented!()
        }

        fn execute_returning_count<T>(&self, _source: &T) -> QueryResult<usize>
        where
            T: QueryFragment<Pg> + QueryId,
        {
            unimplemented!()
        }

        fn transaction_manager(&self) -> &Self::TransactionManager {
            &self.tr
        }
    }

    impl SimpleConnection for MockConnection {
        fn batch_execute(&self, _query: &str) -> QueryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockConnectionManager;

    impl ManageConnection for MockConnectionManager {
        type Connection = MockConnection;
        type Error = MockError;

        fn connect(&self) -> Result<MockConnection, MockError> {
            Ok(MockConnection::default())
        }

        fn is_valid(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
            Ok(())
        }

        fn has_broken(&self, _conn: &mut MockConnection) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct MockError {}

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Mock connection error")
        }
    }

    impl Error for MockError {
        fn description(&self) -> &str {
            "Mock connection error"
        }

        fn cause(&self) -> Option<&Error> {
            None
        }
    }
}
