//! Companies repo, presents CRUD operations with db for supplier companies
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{CompaniesSearchFilters, Company, CompanyCategory, NewCompany, NewCompanyCategory, RawCategory, UpdateCompany};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::categories::dsl as Categories;
use schema::companies::dsl::*;
use schema::company_categories::dsl as CompanyCategories;
use schema::users::dsl as Users;

/// Companies repository, responsible for handling companies and their
/// category links
pub struct CompaniesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Company>>,
}

pub trait CompaniesRepo {
    /// Find specific company by ID
    fn find(&self, company_id: i32) -> RepoResult<Option<Company>>;

    /// Find companies by IDs
    fn find_many(&self, company_ids: Vec<i32>) -> RepoResult<Vec<Company>>;

    /// Returns one page of companies matching `filters`, newest first
    fn search(&self, filters: CompaniesSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Company>>;

    /// Counts companies matching `filters`
    fn count(&self, filters: CompaniesSearchFilters) -> RepoResult<i64>;

    /// Checks that company email already exists
    fn email_exists(&self, email_arg: String) -> RepoResult<bool>;

    /// Creates new company
    fn create(&self, payload: NewCompany) -> RepoResult<Company>;

    /// Updates specific company
    fn update(&self, company_id: i32, payload: UpdateCompany) -> RepoResult<Company>;

    /// Adds `delta` to the denormalized product count of a company
    fn update_product_count(&self, company_id: i32, delta: i32) -> RepoResult<()>;

    /// Links a company to a category
    fn add_category(&self, payload: NewCompanyCategory) -> RepoResult<CompanyCategory>;

    /// Returns category rows linked to each of `company_ids`
    fn category_links(&self, company_ids: Vec<i32>) -> RepoResult<Vec<(CompanyCategory, RawCategory)>>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CompaniesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Company>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }

    /// Translates the optional filter clauses into one AND-composed
    /// predicate. Shared by `search` and `count` so both always agree on the
    /// predicate.
    fn filtered_query(filters: CompaniesSearchFilters) -> ::schema::companies::BoxedQuery<'a, Pg> {
        let mut query = companies.into_boxed();

        if let Some(term) = filters.term {
            let pattern = format!("%{}%", term);
            query = query.filter(
                name.ilike(pattern.clone())
                    .or(description.ilike(pattern.clone()))
                    .or(city.ilike(pattern)),
            );
        }

        if let Some(category_ids) = filters.category_ids {
            let linked_companies = CompanyCategories::company_categories
                .filter(CompanyCategories::category_id.eq_any(category_ids))
                .select(CompanyCategories::company_id);
            query = query.filter(id.eq_any(linked_companies));
        }

        if let Some(city_arg) = filters.city {
            query = query.filter(city.ilike(format!("%{}%", city_arg)));
        }

        if let Some(province_arg) = filters.province {
            query = query.filter(province.ilike(format!("%{}%", province_arg)));
        }

        if filters.verified_only {
            query = query.filter(verified.eq(true));
        }

        if filters.gold_supplier_only {
            query = query.filter(gold_supplier.eq(true));
        }

        if let Some(min_trust_score) = filters.min_trust_score {
            query = query.filter(trust_score.ge(min_trust_score));
        }

        query
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CompaniesRepo for CompaniesRepoImpl<'a, T> {
    /// Find specific company by ID
    fn find(&self, company_id_arg: i32) -> RepoResult<Option<Company>> {
        debug!("Find in companies with id {}.", company_id_arg);
        let query = companies.find(company_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|company: Option<Company>| {
                if let Some(ref company) = company {
                    acl::check(&*self.acl, Resource::Companies, Action::Read, self, Some(company))?;
                };
                Ok(company)
            })
            .map_err(|e: FailureError| e.context(format!("Find company with id: {} error occured", company_id_arg)).into())
    }

    /// Find companies by IDs
    fn find_many(&self, company_ids: Vec<i32>) -> RepoResult<Vec<Company>> {
        debug!("Find in companies {:?}.", company_ids);
        let query = companies.filter(id.eq_any(company_ids.clone())).order(id);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|companies_res: Vec<Company>| {
                for company in &companies_res {
                    acl::check(&*self.acl, Resource::Companies, Action::Read, self, Some(company))?;
                }
                Ok(companies_res.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Find in companies {:?} error occured.", company_ids)).into())
    }

    /// Returns one page of companies matching `filters`, newest first
    fn search(&self, filters: CompaniesSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Company>> {
        debug!("Search in companies with filters {:?}, skip {}, count {}.", filters, skip, count);
        let query = Self::filtered_query(filters.clone())
            .order((created_at.desc(), id.desc()))
            .offset(skip)
            .limit(count);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|companies_res: Vec<Company>| {
                for company in &companies_res {
                    acl::check(&*self.acl, Resource::Companies, Action::Read, self, Some(company))?;
                }
                Ok(companies_res.clone())
            })
            .map_err(|e: FailureError| {
                e.context(format!("Search in companies with filters {:?} error occured.", filters))
                    .into()
            })
    }

    /// Counts companies matching `filters`
    fn count(&self, filters: CompaniesSearchFilters) -> RepoResult<i64> {
        debug!("Count companies with filters {:?}.", filters);
        let query = Self::filtered_query(filters.clone()).count();

        query
            .get_result(self.db_conn)
            .map_err(From::from)
            .and_then(|total: i64| {
                acl::check(&*self.acl, Resource::Companies, Action::Read, self, None)?;
                Ok(total)
            })
            .map_err(|e: FailureError| e.context(format!("Count companies with filters {:?} error occured.", filters)).into())
    }

    /// Checks that company email already exists
    fn email_exists(&self, email_arg: String) -> RepoResult<bool> {
        debug!("Check if company email {} exists.", email_arg);
        let query = diesel::select(exists(companies.filter(email.eq(email_arg.clone()))));

        query
            .get_result(self.db_conn)
            .map_err(From::from)
            .and_then(|exists_res| {
                acl::check(&*self.acl, Resource::Companies, Action::Read, self, None)?;
                Ok(exists_res)
            })
            .map_err(|e: FailureError| e.context(format!("Check if company email {} exists error occured.", email_arg)).into())
    }

    /// Creates new company
    fn create(&self, payload: NewCompany) -> RepoResult<Company> {
        debug!("Create company {:?}.", payload);
        acl::check(&*self.acl, Resource::Companies, Action::Create, self, None)
            .and_then(|_| {
                let query_company = diesel::insert_into(companies).values(&payload);
                query_company.get_result::<Company>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| e.context(format!("Create company {:?} error occured.", payload)).into())
    }

    /// Updates specific company
    fn update(&self, company_id_arg: i32, payload: UpdateCompany) -> RepoResult<Company> {
        debug!("Updating company with id {} and payload {:?}.", company_id_arg, payload);
        self.execute_query(companies.find(company_id_arg))
            .and_then(|company: Company| acl::check(&*self.acl, Resource::Companies, Action::Update, self, Some(&company)))
            .and_then(|_| {
                let filter = companies.filter(id.eq(company_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<Company>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating company with id {} and payload {:?} error occured.",
                    company_id_arg, payload
                ))
                .into()
            })
    }

    /// Adds `delta` to the denormalized product count of a company
    fn update_product_count(&self, company_id_arg: i32, delta: i32) -> RepoResult<()> {
        debug!("Updating product count of company {} by {}.", company_id_arg, delta);
        let filter = companies.filter(id.eq(company_id_arg));
        diesel::update(filter)
            .set(product_count.eq(product_count + delta))
            .execute(self.db_conn)
            .map(|_| ())
            .map_err(|e| {
                FailureError::from(e)
                    .context(format!("Updating product count of company {} by {} error occured.", company_id_arg, delta))
                    .into()
            })
    }

    /// Links a company to a category
    fn add_category(&self, payload: NewCompanyCategory) -> RepoResult<CompanyCategory> {
        debug!("Add category link {:?}.", payload);
        self.execute_query(companies.find(payload.company_id))
            .and_then(|company: Company| acl::check(&*self.acl, Resource::CompanyCategories, Action::Create, self, Some(&company)))
            .and_then(|_| {
                let query = diesel::insert_into(CompanyCategories::company_categories).values(&payload);
                query.get_result::<CompanyCategory>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| e.context(format!("Add category link {:?} error occured.", payload)).into())
    }

    /// Returns category rows linked to each of `company_ids`
    fn category_links(&self, company_ids: Vec<i32>) -> RepoResult<Vec<(CompanyCategory, RawCategory)>> {
        debug!("Find category links of companies {:?}.", company_ids);
        let query = CompanyCategories::company_categories
            .inner_join(Categories::categories)
            .filter(CompanyCategories::company_id.eq_any(company_ids.clone()))
            .order(CompanyCategories::id);

        query
            .get_results::<(CompanyCategory, RawCategory)>(self.db_conn)
            .map_err(From::from)
            .and_then(|links| {
                acl::check(&*self.acl, Resource::CompanyCategories, Action::Read, self, None)?;
                Ok(links)
            })
            .map_err(|e: FailureError| {
                e.context(format!("Find category links of companies {:?} error occured.", company_ids))
                    .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Company>
    for CompaniesRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&Company>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(company) = obj {
                    Users::users
                        .filter(Users::id.eq(user_id_arg))
                        .select(Users::company_id)
                        .get_result::<Option<i32>>(self.db_conn)
                        .ok()
                        .and_then(|user_company_id| user_company_id)
                        .map(|user_company_id| user_company_id == company.id)
                        .unwrap_or(false)
                } else {
                    false
                }
            }
        }
    }
}
