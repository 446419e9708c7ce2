//! Rfqs repo, presents CRUD operations with db for requests for quotation
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{InsertRfq, Rfq, RfqsSearchFilters, UpdateRfq};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::rfqs::dsl::*;

/// Rfqs repository, responsible for handling rfqs
pub struct RfqsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<Rfq>>,
}

pub trait RfqsRepo {
    /// Find specific rfq by ID
    fn find(&self, rfq_id: i32) -> RepoResult<Option<Rfq>>;

    /// Returns one page of rfqs matching `filters`, newest first
    fn search(&self, filters: RfqsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Rfq>>;

    /// Counts rfqs matching `filters`
    fn count(&self, filters: RfqsSearchFilters) -> RepoResult<i64>;

    /// Creates new rfq
    fn create(&self, payload: InsertRfq) -> RepoResult<Rfq>;

    /// Updates specific rfq
    fn update(&self, rfq_id: i32, payload: UpdateRfq) -> RepoResult<Rfq>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RfqsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<Rfq>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }

    /// Translates the optional filter clauses into one AND-composed
    /// predicate. Shared by `search` and `count` so both always agree on the
    /// predicate.
    fn filtered_query(filters: RfqsSearchFilters) -> ::schema::rfqs::BoxedQuery<'a, Pg> {
        let mut query = rfqs.into_boxed();

        if let Some(status_arg) = filters.status {
            query = query.filter(status.eq(status_arg));
        }

        if let Some(category_id_arg) = filters.category_id {
            query = query.filter(category_id.eq(category_id_arg));
        }

        if let Some(buyer_id_arg) = filters.buyer_id {
            query = query.filter(buyer_id.eq(buyer_id_arg));
        }

        query
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> RfqsRepo for RfqsRepoImpl<'a, T> {
    /// Find specific rfq by ID
    fn find(&self, rfq_id_arg: i32) -> RepoResult<Option<Rfq>> {
        debug!("Find in rfqs with id {}.", rfq_id_arg);
        let query = rfqs.find(rfq_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|rfq: Option<Rfq>| {
                if let Some(ref rfq) = rfq {
                    acl::check(&*self.acl, Resource::Rfqs, Action::Read, self, Some(rfq))?;
                };
                Ok(rfq)
            })
            .map_err(|e: FailureError| e.context(format!("Find rfq with id: {} error occured", rfq_id_arg)).into())
    }

    /// Returns one page of rfqs matching `filters`, newest first
    fn search(&self, filters: RfqsSearchFilters, skip: i64, count: i64) -> RepoResult<Vec<Rfq>> {
        debug!("Search in rfqs with filters {:?}, skip {}, count {}.", filters, skip, count);
        let query = Self::filtered_query(filters.clone())
            .order((created_at.desc(), id.desc()))
            .offset(skip)
            .limit(count);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|rfqs_res: Vec<Rfq>| {
                for rfq in &rfqs_res {
                    acl::check(&*self.acl, Resource::Rfqs, Action::Read, self, Some(rfq))?;
                }
                Ok(rfqs_res.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Search in rfqs with filters {:?} error occured.", filters)).into())
    }

    /// Counts rfqs matching `filters`
    fn count(&self, filters: RfqsSearchFilters) -> RepoResult<i64> {
        debug!("Count rfqs with filters {:?}.", filters);
        let query = Self::filtered_query(filters.clone()).count();

        query
            .get_result(self.db_conn)
            .map_err(From::from)
            .and_then(|total: i64| {
                acl::check(&*self.acl, Resource::Rfqs, Action::Read, self, None)?;
                Ok(total)
            })
            .map_err(|e: FailureError| e.context(format!("Count rfqs with filters {:?} error occured.", filters)).into())
    }

    /// Creates new rfq
    fn create(&self, payload: InsertRfq) -> RepoResult<Rfq> {
        debug!("Create rfq {:?}.", payload);
        let query_rfq = diesel::insert_into(rfqs).values(&payload);
        query_rfq
            .get_result::<Rfq>(self.db_conn)
            .map_err(From::from)
            .and_then(|rfq| acl::check(&*self.acl, Resource::Rfqs, Action::Create, self, Some(&rfq)).and_then(|_| Ok(rfq)))
            .map_err(|e: FailureError| e.context(format!("Create rfq {:?} error occured.", payload)).into())
    }

    /// Updates specific rfq
    fn update(&self, rfq_id_arg: i32, payload: UpdateRfq) -> RepoResult<Rfq> {
        debug!("Updating rfq with id {} and payload {:?}.", rfq_id_arg, payload);
        self.execute_query(rfqs.find(rfq_id_arg))
            .and_then(|rfq: Rfq| acl::check(&*self.acl, Resource::Rfqs, Action::Update, self, Some(&rfq)))
            .and_then(|_| {
                let filter = rfqs.filter(id.eq(rfq_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<Rfq>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!("Updating rfq with id {} and payload {:?} error occured.", rfq_id_arg, payload))
                    .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, Rfq>
    for RfqsRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&Rfq>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(rfq) = obj {
                    rfq.buyer_id == user_id_arg
                } else {
                    false
                }
            }
        }
    }
}
