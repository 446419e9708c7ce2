//! Rfq responses repo, presents CRUD operations with db for supplier quotes
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{InsertRfqResponse, RfqResponse, UpdateRfqResponse};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::rfq_responses::dsl::*;
use schema::rfqs::dsl as Rfqs;

/// Rfq responses repository, responsible for handling supplier quotes
pub struct RfqResponsesRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<RfqResponse>>,
}

pub trait RfqResponsesRepo {
    /// Find specific rfq response by ID
    fn find(&self, response_id: i32) -> RepoResult<Option<RfqResponse>>;

    /// Returns responses of each of `rfq_ids`, newest first
    fn list_for_rfqs(&self, rfq_ids: Vec<i32>) -> RepoResult<Vec<RfqResponse>>;

    /// Creates new rfq response
    fn create(&self, payload: InsertRfqResponse) -> RepoResult<RfqResponse>;

    /// Updates specific rfq response
    fn update(&self, response_id: i32, payload: UpdateRfqResponse) -> RepoResult<RfqResponse>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RfqResponsesRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<RfqResponse>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RfqResponsesRepo
    for RfqResponsesRepoImpl<'a, T>
{
    /// Find specific rfq response by ID
    fn find(&self, response_id_arg: i32) -> RepoResult<Option<RfqResponse>> {
        debug!("Find in rfq responses with id {}.", response_id_arg);
        let query = rfq_responses.find(response_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|response: Option<RfqResponse>| {
                if let Some(ref response) = response {
                    acl::check(&*self.acl, Resource::RfqResponses, Action::Read, self, Some(response))?;
                };
                Ok(response)
            })
            .map_err(|e: FailureError| e.context(format!("Find rfq response with id: {} error occured", response_id_arg)).into())
    }

    /// Returns responses of each of `rfq_ids`, newest first
    fn list_for_rfqs(&self, rfq_ids: Vec<i32>) -> RepoResult<Vec<RfqResponse>> {
        debug!("Find in rfq responses for rfqs {:?}.", rfq_ids);
        let query = rfq_responses
            .filter(rfq_id.eq_any(rfq_ids.clone()))
            .order((created_at.desc(), id.desc()));

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|responses: Vec<RfqResponse>| {
                for response in &responses {
                    acl::check(&*self.acl, Resource::RfqResponses, Action::Read, self, Some(response))?;
                }
                Ok(responses.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Find in rfq responses for rfqs {:?} error occured.", rfq_ids)).into())
    }

    /// Creates new rfq response
    fn create(&self, payload: InsertRfqResponse) -> RepoResult<RfqResponse> {
        debug!("Create rfq response {:?}.", payload);
        let query_response = diesel::insert_into(rfq_responses).values(&payload);
        query_response
            .get_result::<RfqResponse>(self.db_conn)
            .map_err(From::from)
            .and_then(|response| {
                acl::check(&*self.acl, Resource::RfqResponses, Action::Create, self, Some(&response)).and_then(|_| Ok(response))
            })
            .map_err(|e: FailureError| e.context(format!("Create rfq response {:?} error occured.", payload)).into())
    }

    /// Updates specific rfq response
    fn update(&self, response_id_arg: i32, payload: UpdateRfqResponse) -> RepoResult<RfqResponse> {
        debug!("Updating rfq response with id {} and payload {:?}.", response_id_arg, payload);
        self.execute_query(rfq_responses.find(response_id_arg))
            .and_then(|response: RfqResponse| acl::check(&*self.acl, Resource::RfqResponses, Action::Update, self, Some(&response)))
            .and_then(|_| {
                let filter = rfq_responses.filter(id.eq(response_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<RfqResponse>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Updating rfq response with id {} and payload {:?} error occured.",
                    response_id_arg, payload
                ))
                .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, RfqResponse>
    for RfqResponsesRepoImpl<'a, T>
{
    /// A response is owned by the supplier who sent it, and by the buyer of
    /// the rfq it answers (who accepts or rejects it).
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&RfqResponse>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(response) = obj {
                    if response.supplier_id == user_id_arg {
                        return true;
                    }
                    Rfqs::rfqs
                        .filter(Rfqs::id.eq(response.rfq_id))
                        .select(Rfqs::buyer_id)
                        .get_result::<i32>(self.db_conn)
                        .map(|rfq_buyer_id| rfq_buyer_id == user_id_arg)
                        .unwrap_or(false)
                } else {
                    false
                }
            }
        }
    }
}
