//! Companies Services, presents listing and CRUD operations with supplier companies
use std::borrow::Cow;
use std::collections::HashMap;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::{Validate, ValidationError, ValidationErrors};

use super::types::ServiceFuture;
use errors::Error;
use models::*;
use repos::{CompaniesRepo, ReposFactory};
use services::Service;

pub trait CompaniesService {
    /// Returns one page of the public companies listing
    fn list_companies(&self, terms: CompaniesSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<CompanyListItem>>;
    /// Returns company by ID
    fn get_company(&self, company_id: i32) -> ServiceFuture<Option<CompanyDetails>>;
    /// Creates new company and links it to the creating supplier
    fn create_company(&self, payload: NewCompany, category_ids: Vec<i32>) -> ServiceFuture<CompanyDetails>;
    /// Updates specific company
    fn update_company(&self, company_id: i32, payload: UpdateCompany) -> ServiceFuture<CompanyDetails>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > CompaniesService for Service<T, M, F>
{
    /// Returns one page of the public companies listing
    fn list_companies(&self, terms: CompaniesSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<CompanyListItem>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                let companies_repo = repo_factory.create_companies_repo(&*conn, user_id);

                let mut filters = CompaniesSearchFilters {
                    term: terms.term.clone(),
                    category_ids: None,
                    city: terms.city.clone(),
                    province: terms.province.clone(),
                    verified_only: terms.verified_only,
                    gold_supplier_only: terms.gold_supplier_only,
                    min_trust_score: terms.min_trust_score,
                };
                if let Some(ref category) = terms.category {
                    let category_ids = categories_repo
                        .find_by_slug_or_id(category)?
                        .into_iter()
                        .map(|category| category.id)
                        .collect();
                    filters.category_ids = Some(category_ids);
                }

                let total = companies_repo.count(filters.clone())?;
                let page_companies = companies_repo.search(filters, pagination.skip(), pagination.page_size)?;

                let company_ids = page_companies.iter().map(|company| company.id).collect();
                let mut links: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
                for (link, category) in companies_repo.category_links(company_ids)? {
                    links.entry(link.company_id).or_insert_with(Vec::new).push(category.into());
                }

                let items = page_companies
                    .into_iter()
                    .map(|company| {
                        let categories = links.remove(&company.id).unwrap_or_default();
                        CompanyListItem::new(company, categories)
                    })
                    .collect();

                Ok(Page::new(items, total, pagination))
            }
            .map_err(|e: FailureError| e.context("Service Companies, list_companies endpoint error occured.").into())
        })
    }

    /// Returns company by ID
    fn get_company(&self, company_id: i32) -> ServiceFuture<Option<CompanyDetails>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let companies_repo = repo_factory.create_companies_repo(&*conn, user_id);
                let company = match companies_repo.find(company_id)? {
                    Some(company) => company,
                    None => return Ok(None),
                };

                let categories = linked_categories(&*companies_repo, company.id)?;
                Ok(Some(CompanyDetails::new(company, categories)))
            }
            .map_err(|e: FailureError| e.context("Service Companies, get_company endpoint error occured.").into())
        })
    }

    /// Creates new company and links it to the creating supplier
    fn create_company(&self, payload: NewCompany, category_ids: Vec<i32>) -> ServiceFuture<CompanyDetails> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let users_repo = repo_factory.create_users_repo(&*conn, Some(user_id));
                let companies_repo = repo_factory.create_companies_repo(&*conn, Some(user_id));

                if companies_repo.email_exists(payload.email.clone())? {
                    let mut errors = ValidationErrors::new();
                    errors.add(
                        "email",
                        ValidationError {
                            code: Cow::from("email"),
                            message: Some(Cow::from("Company with this email already exists")),
                            params: HashMap::new(),
                        },
                    );
                    return Err(FailureError::from(Error::Validate(errors)));
                }

                let user = users_repo
                    .find(user_id)?
                    .ok_or_else(|| format_err!("User {} not found", user_id).context(Error::Forbidden))?;

                conn.transaction::<CompanyDetails, FailureError, _>(move || {
                    let company = companies_repo.create(payload)?;

                    if user.role == UserRole::Supplier && user.company_id.is_none() {
                        users_repo.set_company(user.id, company.id)?;
                    }

                    for category_id in category_ids {
                        companies_repo.add_category(NewCompanyCategory {
                            company_id: company.id,
                            category_id,
                        })?;
                    }

                    let categories = linked_categories(&*companies_repo, company.id)?;
                    Ok(CompanyDetails::new(company, categories))
                })
            }
            .map_err(|e: FailureError| e.context("Service Companies, create_company endpoint error occured.").into())
        })
    }

    /// Updates specific company
    fn update_company(&self, company_id: i32, payload: UpdateCompany) -> ServiceFuture<CompanyDetails> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let companies_repo = repo_factory.create_companies_repo(&*conn, user_id);
                let company = companies_repo.update(company_id, payload)?;
                let categories = linked_categories(&*companies_repo, company.id)?;
                Ok(CompanyDetails::new(company, categories))
            }
            .map_err(|e: FailureError| e.context("Service Companies, update_company endpoint error occured.").into())
        })
    }
}

fn linked_categories(companies_repo: &CompaniesRepo, company_id: i32) -> Result<Vec<CategorySummary>, FailureError> {
    let categories = companies_repo
        .category_links(vec![company_id])?
        .into_iter()
        .map(|(_, category)| category.into())
        .collect();
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use super::*;
    use models::*;
    use repos::repo_factory::tests::*;

    fn list(
        service: &Service<MockConnection, MockConnectionManager, ReposFactoryMock>,
        terms: CompaniesSearchTerms,
        pagination: PaginationParams,
    ) -> Page<CompanyListItem> {
        let mut core = Core::new().unwrap();
        core.run(service.list_companies(terms, pagination)).unwrap()
    }

    #[test]
    fn second_page_skips_the_first_twenty() {
        let service = create_service(None);
        let page = list(
            &service,
            CompaniesSearchTerms::default(),
            PaginationParams::new(Some(2), Some(20)),
        );

        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        // 45 companies ordered newest first: page two starts at id 25
        assert_eq!(page.items[0].id, 25);
        assert_eq!(page.items[19].id, 6);
    }

    #[test]
    fn min_trust_score_is_an_inclusive_lower_bound() {
        let service = create_service(None);
        let page = list(
            &service,
            CompaniesSearchTerms {
                min_trust_score: Some(40),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        // trust scores in the fixtures equal the company id
        assert_eq!(page.total, 6);
        assert!(page.items.iter().all(|item| item.trust_score.unwrap() >= 40));
    }

    #[test]
    fn category_filter_accepts_slug_and_id() {
        let service = create_service(None);
        let by_slug = list(
            &service,
            CompaniesSearchTerms {
                category: Some("textiles".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );
        let by_id = list(
            &service,
            CompaniesSearchTerms {
                category: Some("1".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        let slug_ids: Vec<i32> = by_slug.items.iter().map(|item| item.id).collect();
        let id_ids: Vec<i32> = by_id.items.iter().map(|item| item.id).collect();
        assert_eq!(slug_ids, id_ids);
        assert_eq!(by_slug.total, by_id.total);
    }

    #[test]
    fn verified_only_excludes_unverified_companies() {
        let service = create_service(None);
        let page = list(
            &service,
            CompaniesSearchTerms {
                verified_only: true,
                ..Default::default()
            },
            PaginationParams::new(Some(1), Some(50)),
        );

        assert_eq!(page.total, 23);
        assert!(page.items.iter().all(|item| item.verified));
    }

    #[test]
    fn city_filter_matches_case_insensitively() {
        let service = create_service(None);
        let page = list(
            &service,
            CompaniesSearchTerms {
                city: Some("karachi".to_string()),
                ..Default::default()
            },
            PaginationParams::new(Some(1), Some(50)),
        );

        assert_eq!(page.total, 22);
        assert!(page.items.iter().all(|item| item.location.city == "Karachi"));
    }

    fn new_company_payload(email: &str) -> NewCompany {
        NewCompany {
            name: "New Trade Company".to_string(),
            description: "Wholesale textiles".to_string(),
            email: email.to_string(),
            phone: None,
            website: None,
            city: "Karachi".to_string(),
            province: "Sindh".to_string(),
            country: "Pakistan".to_string(),
            logo: None,
            cover_image: None,
            year_established: None,
            employee_count: None,
            certifications: None,
            main_products: None,
        }
    }

    #[test]
    fn duplicate_company_email_is_rejected() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let result = core.run(service.create_company(new_company_payload("supplier1@example.com"), vec![]));
        assert!(result.is_err());
    }

    #[test]
    fn create_company_succeeds_for_supplier() {
        let service = create_service(Some(MOCK_NEW_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let created = core
            .run(service.create_company(new_company_payload("fresh@example.com"), vec![1]))
            .unwrap();
        assert_eq!(created.summary.name, "New Trade Company".to_string());
        assert_eq!(created.summary.verified, false);
    }
}
