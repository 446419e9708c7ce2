//! Rfqs Services, presents listing and CRUD operations with requests for
//! quotation and their supplier responses
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
use repos::{RepoResult, ReposFactory};
use services::Service;

pub trait RfqsService {
    /// Returns one page of the rfq listing
    fn list_rfqs(&self, terms: RfqsSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<RfqListItem>>;
    /// Returns rfq by ID
    fn get_rfq(&self, rfq_id: i32) -> ServiceFuture<Option<RfqListItem>>;
    /// Creates rfq owned by the authenticated buyer
    fn create_rfq(&self, payload: NewRfq) -> ServiceFuture<RfqListItem>;
    /// Updates specific rfq
    fn update_rfq(&self, rfq_id: i32, payload: UpdateRfq) -> ServiceFuture<RfqListItem>;
    /// Creates a supplier response to an open rfq
    fn respond_to_rfq(&self, rfq_id: i32, payload: NewRfqResponse) -> ServiceFuture<RfqResponseListItem>;
    /// Accepts or rejects a response; only the buyer of the rfq may decide
    fn update_rfq_response(&self, rfq_id: i32, response_id: i32, payload: UpdateRfqResponse) -> ServiceFuture<RfqResponseListItem>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > RfqsService for Service<T, M, F>
{
    /// Returns one page of the rfq listing
    fn list_rfqs(&self, terms: RfqsSearchTerms, pagination: PaginationParams) -> ServiceFuture<Page<RfqListItem>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let rfqs_repo = repo_factory.create_rfqs_repo(&*conn, user_id);

                // A supplier browsing without an explicit status only sees
                // rfqs they can still answer.
                let status = match (terms.supplier_id, terms.status) {
                    (Some(_), None) => Some(RfqStatus::Open),
                    (_, status) => status,
                };
                let filters = RfqsSearchFilters {
                    status,
                    category_id: terms.category_id,
                    buyer_id: terms.buyer_id,
                };

                let total = rfqs_repo.count(filters.clone())?;
                let page_rfqs = rfqs_repo.search(filters, pagination.skip(), pagination.page_size)?;

                let items = assemble_rfqs(&repo_factory, &*conn, user_id, page_rfqs)?;
                Ok(Page::new(items, total, pagination))
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, list_rfqs endpoint error occured.").into())
        })
    }

    /// Returns rfq by ID
    fn get_rfq(&self, rfq_id: i32) -> ServiceFuture<Option<RfqListItem>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let rfqs_repo = repo_factory.create_rfqs_repo(&*conn, user_id);
                let rfq = match rfqs_repo.find(rfq_id)? {
                    Some(rfq) => rfq,
                    None => return Ok(None),
                };

                let mut items = assemble_rfqs(&repo_factory, &*conn, user_id, vec![rfq])?;
                Ok(items.pop())
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, get_rfq endpoint error occured.").into())
        })
    }

    /// Creates rfq owned by the authenticated buyer
    fn create_rfq(&self, payload: NewRfq) -> ServiceFuture<RfqListItem> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let categories_repo = repo_factory.create_categories_repo(&*conn, Some(user_id));
                let rfqs_repo = repo_factory.create_rfqs_repo(&*conn, Some(user_id));

                categories_repo
                    .find(payload.category_id)?
                    .ok_or_else(|| format_err!("Category {} not found", payload.category_id).context(Error::NotFound))?;

                let rfq = rfqs_repo.create(payload.into_insert(user_id))?;
                let mut items = assemble_rfqs(&repo_factory, &*conn, Some(user_id), vec![rfq])?;
                items.pop().ok_or_else(|| format_err!("Created rfq could not be loaded").context(Error::Internal).into())
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, create_rfq endpoint error occured.").into())
        })
    }

    /// Updates specific rfq
    fn update_rfq(&self, rfq_id: i32, payload: UpdateRfq) -> ServiceFuture<RfqListItem> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let rfqs_repo = repo_factory.create_rfqs_repo(&*conn, user_id);
                let rfq = rfqs_repo.update(rfq_id, payload)?;
                let mut items = assemble_rfqs(&repo_factory, &*conn, user_id, vec![rfq])?;
                items.pop().ok_or_else(|| format_err!("Updated rfq could not be loaded").context(Error::Internal).into())
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, update_rfq endpoint error occured.").into())
        })
    }

    /// Creates a supplier response to an open rfq
    fn respond_to_rfq(&self, rfq_id: i32, payload: NewRfqResponse) -> ServiceFuture<RfqResponseListItem> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);
                let companies_repo = repo_factory.create_companies_repo(&*conn, Some(user_id));
                let rfqs_repo = repo_factory.create_rfqs_repo(&*conn, Some(user_id));
                let responses_repo = repo_factory.create_rfq_responses_repo(&*conn, Some(user_id));

                let rfq = rfqs_repo
                    .find(rfq_id)?
                    .ok_or_else(|| format_err!("Rfq {} not found", rfq_id).context(Error::NotFound))?;
                if rfq.status != RfqStatus::Open {
                    let mut errors = ValidationErrors::new();
                    errors.add(
                        "status",
                        ValidationError {
                            code: Cow::from("status"),
                            message: Some(Cow::from("Rfq is not open for responses")),
                            params: HashMap::new(),
                        },
                    );
                    return Err(format_err!("Rfq {} is not open for responses", rfq_id)
                        .context(Error::Validate(errors))
                        .into());
                }

                let supplier = users_repo
                    .find(user_id)?
                    .ok_or_else(|| format_err!("User {} not found", user_id).context(Error::Forbidden))?;
                let supplier_company = match supplier.company_id {
                    Some(company_id) => companies_repo.find(company_id)?.map(|company| company.name),
                    None => None,
                };

                let response = responses_repo.create(payload.into_insert(rfq_id, supplier.id, supplier_company))?;
                Ok(RfqResponseListItem::new(response, supplier.into()))
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, respond_to_rfq endpoint error occured.").into())
        })
    }

    /// Accepts or rejects a response; only the buyer of the rfq may decide
    fn update_rfq_response(&self, rfq_id: i32, response_id: i32, payload: UpdateRfqResponse) -> ServiceFuture<RfqResponseListItem> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);
                let responses_repo = repo_factory.create_rfq_responses_repo(&*conn, user_id);

                let response = responses_repo
                    .find(response_id)?
                    .ok_or_else(|| format_err!("Rfq response {} not found", response_id).context(Error::NotFound))?;
                if response.rfq_id != rfq_id {
                    return Err(format_err!("Rfq response {} does not belong to rfq {}", response_id, rfq_id)
                        .context(Error::NotFound)
                        .into());
                }

                let updated = responses_repo.update(response_id, payload)?;
                let supplier = users_repo
                    .find(updated.supplier_id)?
                    .ok_or_else(|| format_err!("Supplier {} of response {} not found", updated.supplier_id, response_id).context(Error::Internal))?;
                Ok(RfqResponseListItem::new(updated, supplier.into()))
            }
            .map_err(|e: FailureError| e.context("Service Rfqs, update_rfq_response endpoint error occured.").into())
        })
    }
}

/// Loads buyers, categories and responses of a page of rfqs and builds the
/// wire items
fn assemble_rfqs<T, F>(repo_factory: &F, conn: &T, user_id: Option<i32>, page_rfqs: Vec<Rfq>) -> RepoResult<Vec<RfqListItem>>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    F: ReposFactory<T>,
{
    let categories_repo = repo_factory.create_categories_repo(conn, user_id);
    let companies_repo = repo_factory.create_companies_repo(conn, user_id);
    let responses_repo = repo_factory.create_rfq_responses_repo(conn, user_id);
    // buyers and suppliers embedded into public rfq payloads are read with
    // system acl, the caller does not own those accounts
    let users_repo = repo_factory.create_users_repo_with_sys_acl(conn);

    let category_ids = page_rfqs.iter().map(|rfq| rfq.category_id).collect();
    let categories = categories_repo.find_many(category_ids)?;

    let rfq_ids: Vec<i32> = page_rfqs.iter().map(|rfq| rfq.id).collect();
    let mut responses: HashMap<i32, Vec<RfqResponse>> = HashMap::new();
    for response in responses_repo.list_for_rfqs(rfq_ids)? {
        responses.entry(response.rfq_id).or_insert_with(Vec::new).push(response);
    }

    let mut user_ids: Vec<i32> = page_rfqs.iter().map(|rfq| rfq.buyer_id).collect();
    user_ids.extend(responses.values().flat_map(|list| list.iter().map(|response| response.supplier_id)));
    user_ids.sort();
    user_ids.dedup();
    let users = users_repo.find_many(user_ids)?;

    let buyer_company_ids: Vec<i32> = users.iter().filter_map(|user| user.company_id).collect();
    let buyer_companies = companies_repo.find_many(buyer_company_ids)?;

    let items = page_rfqs
        .into_iter()
        .filter_map(|rfq| {
            let category = categories.iter().find(|category| category.id == rfq.category_id).cloned();
            let buyer = users.iter().find(|user| user.id == rfq.buyer_id).cloned();
            let rfq_responses = responses
                .remove(&rfq.id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|response| {
                    users
                        .iter()
                        .find(|user| user.id == response.supplier_id)
                        .cloned()
                        .map(|supplier| RfqResponseListItem::new(response, supplier.into()))
                })
                .collect();
            match (category, buyer) {
                (Some(category), Some(buyer)) => {
                    let buyer_company = buyer
                        .company_id
                        .and_then(|company_id| buyer_companies.iter().find(|company| company.id == company_id))
                        .map(|company| company.name.clone());
                    Some(RfqListItem::new(rfq, category.into(), RfqBuyer::new(buyer, buyer_company), rfq_responses))
                }
                _ => None,
            }
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use super::*;
    use models::*;
    use repos::repo_factory::tests::*;

    fn list(
        service: &Service<MockConnection, MockConnectionManager, ReposFactoryMock>,
        terms: RfqsSearchTerms,
        pagination: PaginationParams,
    ) -> Page<RfqListItem> {
        let mut core = Core::new().unwrap();
        core.run(service.list_rfqs(terms, pagination)).unwrap()
    }

    #[test]
    fn supplier_browsing_defaults_to_open_rfqs() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let page = list(
            &service,
            RfqsSearchTerms {
                supplier_id: Some(MOCK_SUPPLIER_ID),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|item| item.status == RfqStatus::Open));
    }

    #[test]
    fn explicit_status_wins_over_the_supplier_default() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let page = list(
            &service,
            RfqsSearchTerms {
                supplier_id: Some(MOCK_SUPPLIER_ID),
                status: Some(RfqStatus::Closed),
                ..Default::default()
            },
            PaginationParams::default(),
        );

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].status, RfqStatus::Closed);
    }

    #[test]
    fn rfq_listing_is_paginated() {
        let service = create_service(None);
        let page = list(&service, RfqsSearchTerms::default(), PaginationParams::new(Some(1), Some(2)));

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        // newest first
        assert_eq!(page.items[0].id, 5);
    }

    #[test]
    fn responses_are_embedded_with_their_suppliers() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let rfq = core.run(service.get_rfq(1)).unwrap().unwrap();

        assert_eq!(rfq.responses.len(), 1);
        assert_eq!(rfq.responses[0].supplier.id, MOCK_SUPPLIER_ID);
        assert_eq!(rfq.buyer.id, MOCK_BUYER_ID);
    }

    fn response_payload() -> NewRfqResponse {
        NewRfqResponse {
            supplier_company: None,
            price_amount: 1200.0,
            price_currency: "USD".to_string(),
            message: None,
        }
    }

    #[test]
    fn responding_to_an_open_rfq_starts_pending() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let response = core.run(service.respond_to_rfq(1, response_payload())).unwrap();

        assert_eq!(response.status, RfqResponseStatus::Pending);
        assert_eq!(response.supplier.id, MOCK_SUPPLIER_ID);
        // company name picked up from the supplier profile
        assert_eq!(response.supplier_company, Some("Supplier 1".to_string()));
    }

    #[test]
    fn responding_to_a_closed_rfq_fails() {
        let service = create_service(Some(MOCK_SUPPLIER_ID));
        let mut core = Core::new().unwrap();
        let result = core.run(service.respond_to_rfq(3, response_payload()));
        assert!(result.is_err());
    }

    #[test]
    fn response_must_belong_to_the_rfq() {
        let service = create_service(Some(MOCK_BUYER_ID));
        let mut core = Core::new().unwrap();
        let result = core.run(service.update_rfq_response(
            2,
            1,
            UpdateRfqResponse {
                status: RfqResponseStatus::Accepted,
            },
        ));
        assert!(result.is_err());
    }

    #[test]
    fn buyer_accepts_a_response() {
        let service = create_service(Some(MOCK_BUYER_ID));
        let mut core = Core::new().unwrap();
        let response = core
            .run(service.update_rfq_response(
                1,
                1,
                UpdateRfqResponse {
                    status: RfqResponseStatus::Accepted,
                },
            ))
            .unwrap();
        assert_eq!(response.status, RfqResponseStatus::Accepted);
    }
}
