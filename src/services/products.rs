//! Products Services, presents listing and CRUD operations with products
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use super::types::ServiceFuture;
use errors::Error;
use models::*;
use repos::{RepoResult, ReposFactory};
use services::Service;

pub trait ProductsService {
    /// Returns one page of the public product listing
    fn list_products(&self, terms: ProductsSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<ProductListItem>>;
    /// Returns product by ID
    fn get_product(&self, product_id: i32) -> ServiceFuture<Option<ProductDetails>>;
    /// Creates product owned by the company of the authenticated user
    fn create_product(&self, payload: NewProduct) -> ServiceFuture<ProductDetails>;
    /// Updates specific product
    fn update_product(&self, product_id: i32, payload: UpdateProduct) -> ServiceFuture<ProductDetails>;
    /// Deactivates specific product
    fn deactivate_product(&self, product_id: i32) -> ServiceFuture<Product>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > ProductsService for Service<T, M, F>
{
    /// Returns one page of the public product listing
    fn list_products(&self, terms: ProductsSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<ProductListItem>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                let products_repo = repo_factory.create_products_repo(&*conn, user_id);
                let companies_repo = repo_factory.create_companies_repo(&*conn, user_id);

                let mut filters = ProductsSearchFilters {
                    term: terms.term.clone(),
                    category_ids: None,
                    price_range: terms.price_range,
                    company_id: terms.company_id,
                    verified_only: terms.verified_only,
                    gold_supplier_only: terms.gold_supplier_only,
                    membership_tier: terms.membership_tier,
                };
                if let Some(ref category) = terms.category {
                    let category_ids = categories_repo
                        .find_by_slug_or_id(category)?
                        .into_iter()
                        .map(|category| category.id)
                        .collect();
                    filters.category_ids = Some(category_ids);
                }

                // `total` counts rows matching the store predicate; the tags
                // filter below does not participate in it.
                let total = products_repo.count(filters.clone())?;
                let mut page_products = products_repo.search(filters, pagination.skip(), pagination.page_size)?;

                // Tags are matched in memory against the fetched page, so a
                // page can come back shorter than `page_size` while later
                // pages still hold matching rows.
                if let Some(ref tags) = terms.tags {
                    page_products.retain(|product| {
                        let product_tags = product.tag_list();
                        tags.iter().any(|tag| product_tags.contains(tag))
                    });
                }

                let category_ids = page_products.iter().map(|product| product.category_id).collect();
                let company_ids = page_products.iter().map(|product| product.company_id).collect();
                let categories = categories_repo.find_many(category_ids)?;
                let companies = companies_repo.find_many(company_ids)?;

                let items = page_products
                    .into_iter()
                    .filter_map(|product| {
                        let category = categories.iter().find(|category| category.id == product.category_id).cloned();
                        let company = companies.iter().find(|company| company.id == product.company_id).cloned();
                        match (category, company) {
                            (Some(category), Some(company)) => Some(ProductListItem::new(product, category.into(), company.into())),
                            _ => None,
                        }
                    })
                    .collect();

                Ok(Page::new(items, total, pagination))
            }
            .map_err(|e: FailureError| e.context("Service Products, list_products endpoint error occured.").into())
        })
    }

    /// Returns product by ID
    fn get_product(&self, product_id: i32) -> ServiceFuture<Option<ProductDetails>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let products_repo = repo_factory.create_products_repo(&*conn, user_id);
                let product = match products_repo.find(product_id)? {
                    Some(product) => product,
                    None => return Ok(None),
                };

                let (category, company) = load_relations(&repo_factory, &*conn, user_id, &product)?;
                Ok(Some(ProductDetails::new(product, category, company)))
            }
            .map_err(|e: FailureError| e.context("Service Products, get_product endpoint error occured.").into())
        })
    }

    /// Creates product owned by the company of the authenticated user
    fn create_product(&self, payload: NewProduct) -> ServiceFuture<ProductDetails> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let users_repo = repo_factory.create_users_repo(&*conn, Some(user_id));
                let categories_repo = repo_factory.create_categories_repo(&*conn, Some(user_id));
                let companies_repo = repo_factory.create_companies_repo(&*conn, Some(user_id));
                let products_repo = repo_factory.create_products_repo(&*conn, Some(user_id));

                let user = users_repo
                    .find(user_id)?
                    .ok_or_else(|| format_err!("User {} not found", user_id).context(Error::Forbidden))?;
                let company_id = user
                    .company_id
                    .ok_or_else(|| format_err!("User {} has no company profile", user_id).context(Error::Forbidden))?;

                let category = categories_repo
                    .find(payload.category_id)?
                    .ok_or_else(|| format_err!("Category {} not found", payload.category_id).context(Error::NotFound))?;
                let company = companies_repo
                    .find(company_id)?
                    .ok_or_else(|| format_err!("Company {} not found", company_id).context(Error::NotFound))?;

                conn.transaction::<ProductDetails, FailureError, _>(move || {
                    let product = products_repo.create(payload.into_insert(company_id))?;
                    categories_repo.update_product_count(product.category_id, 1)?;
                    companies_repo.update_product_count(product.company_id, 1)?;
                    Ok(ProductDetails::new(product, category.into(), company.into()))
                })
            }
            .map_err(|e: FailureError| e.context("Service Products, create_product endpoint error occured.").into())
        })
    }

    /// Updates specific product
    fn update_product(&self, product_id: i32, payload: UpdateProduct) -> ServiceFuture<ProductDetails> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let products_repo = repo_factory.create_products_repo(&*conn, user_id);
                let product = products_repo.update(product_id, payload)?;
                let (category, company) = load_relations(&repo_factory, &*conn, user_id, &product)?;
                Ok(ProductDetails::new(product, category, company))
            }
            .map_err(|e: FailureError| e.context("Service Products, update_product endpoint error occured.").into())
        })
    }

    /// Deactivates specific product
    fn deactivate_product(&self, product_id: i32) -> ServiceFuture<Product> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let products_repo = repo_factory.create_products_repo(&*conn, user_id);
                let categories_repo = repo_factory.create_categories_repo(&*conn, user_id);
                let companies_repo = repo_factory.create_companies_repo(&*conn, user_id);

                conn.transaction::<Product, FailureError, _>(move || {
                    let product = products_repo.deactivate(product_id)?;
                    categories_repo.update_product_count(product.category_id, -1)?;
                    companies_repo.update_product_count(product.company_id, -1)?;
                    Ok(product)
                })
            }
            .map_err(|e: FailureError| e.context("Service Products, deactivate_product endpoint error occured.").into())
        })
    }
}

fn load_relations<T, F>(
    repo_factory: &F,
    conn: &T,
    user_id: Option<i32>,
    product: &Product,
) -> RepoResult<(CategorySummary, CompanySummary)>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    F: ReposFactory<T>,
{
    let categories_repo = repo_factory.create_categories_repo(conn, user_id);
    let companies_repo = repo_factory.create_companies_repo(conn, user_id);

    let category = categories_repo
        .find(product.category_id)?
        .ok_or_else(|| format_err!("Category {} of product {} not found", product.category_id, product.id).context(Error::Internal))?;
    let company = companies_repo
        .find(product.company_id)?
        .ok_or_else(|| format_err!("Company {} of product {} not found", product.company_id, product.id).context(Error::Internal))?;

    Ok((category.into(), company.into()))
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use super::*;
    use models::*;
    use repos::repo_factory::tests::*;

    fn list(
        service: &Service<MockConnection, MockConnectionManager, ReposFactoryMock>,
        terms: ProductsSearchTerms,
        pagination: PaginationParams,
    ) -> Page<ProductListItem> {
        let mut core = Core::new().unwrap();
        core.run(service.list_products(terms, pagination)).unwrap()
    }

    #[test]
    fn search_counts_only_matching_products() {
        let service = create_service(None);
        let terms = ProductsSearchTerms {
            term: Some("shirt".to_string()),
            ..Default::default()
        };

        let page = list(&service, terms, PaginationParams::default());
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let service = create_service(None);
        let upper = list(
            &service,
            ProductsSearchTerms {
                term: Some("COTTON".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );
        let lower = list(
            &service,
            ProductsSearchTerms {
                term: Some("cotton".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        let upper_ids: Vec<i32> = upper.items.iter().map(|item| item.id).collect();
        let lower_ids: Vec<i32> = lower.items.iter().map(|item| item.id).collect();
        assert_eq!(upper_ids, lower_ids);
        assert_eq!(upper.total, lower.total);
    }

    #[test]
    fn inactive_products_never_listed() {
        let service = create_service(None);
        let page = list(
            &service,
            ProductsSearchTerms::default(),
            PaginationParams::new(Some(1), Some(50)),
        );

        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 25);
        assert!(page.items.iter().all(|item| item.status == ProductStatus::Active));
    }

    #[test]
    fn listing_is_ordered_newest_first() {
        let service = create_service(None);
        let page = list(&service, ProductsSearchTerms::default(), PaginationParams::default());

        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].id, 25);
        assert_eq!(page.items[19].id, 6);
    }

    #[test]
    fn second_page_holds_the_rest() {
        let service = create_service(None);
        let page = list(
            &service,
            ProductsSearchTerms::default(),
            PaginationParams::new(Some(2), Some(20)),
        );

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].id, 5);
    }

    #[test]
    fn tags_narrow_the_fetched_page_but_not_the_total() {
        let service = create_service(None);
        let terms = ProductsSearchTerms {
            tags: Some(vec!["wholesale".to_string()]),
            ..Default::default()
        };

        let page = list(&service, terms, PaginationParams::default());
        // only ids 10 and 20 carry the tag on the first page; the total keeps
        // counting every active product
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 25);
        let ids: Vec<i32> = page.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![20, 10]);
    }

    #[test]
    fn category_filter_accepts_slug_and_id() {
        let service = create_service(None);
        let by_slug = list(
            &service,
            ProductsSearchTerms {
                category: Some("textiles".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );
        let by_id = list(
            &service,
            ProductsSearchTerms {
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
    fn unknown_category_yields_empty_page_not_error() {
        let service = create_service(None);
        let page = list(
            &service,
            ProductsSearchTerms {
                category: Some("no-such-category".to_string()),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        assert_eq!(page.items.len(), 0);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn price_bounds_are_inclusive_and_independent() {
        let service = create_service(None);
        let page = list(
            &service,
            ProductsSearchTerms {
                price_range: Some(RangeFilter {
                    min_value: Some(240.0),
                    max_value: None,
                }),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        // prices are id * 10, so 240 keeps ids 24 and 25
        assert_eq!(page.total, 2);
        let ids: Vec<i32> = page.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![25, 24]);
    }

    fn new_product_payload() -> NewProduct {
        NewProduct {
            name: "Linen shirt".to_string(),
            description: "Breathable linen shirt".to_string(),
            short_description: None,
            category_id: 1,
            price: Price {
                amount: 7.5,
                currency: "USD".to_string(),
                min_order_quantity: Some(50),
            },
            images: None,
            specifications: None,
            tags: None,
            status: None,
        }
    }

    #[test]
    fn create_product_uses_company_of_the_user() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let created = core.run(service.create_product(new_product_payload())).unwrap();
        assert_eq!(created.company.id, MOCK_COMPANY_ID);
        assert_eq!(created.name, "Linen shirt".to_string());
        assert_eq!(created.status, ProductStatus::Active);
    }

    #[test]
    fn create_product_without_company_profile_fails() {
        let service = create_service(Some(MOCK_NEW_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let result = core.run(service.create_product(new_product_payload()));
        assert!(result.is_err());
    }

    #[test]
    fn create_product_without_user_fails() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let result = core.run(service.create_product(new_product_payload()));
        assert!(result.is_err());
    }
}
