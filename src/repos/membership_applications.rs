//! Membership applications repo, presents CRUD operations with db for
//! applications to paid membership tiers
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::LoadQuery;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{ApplicationsSearchTerms, MembershipApplication, NewMembershipApplication, ReviewedApplication};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::membership_applications::dsl::*;

/// Membership applications repository
pub struct MembershipApplicationsRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<MembershipApplication>>,
}

pub trait MembershipApplicationsRepo {
    /// Find specific application by ID
    fn find(&self, application_id: i32) -> RepoResult<Option<MembershipApplication>>;

    /// Returns one page of applications matching `filters`, newest first
    fn search(&self, filters: ApplicationsSearchTerms, skip: i64, count: i64) -> RepoResult<Vec<MembershipApplication>>;

    /// Counts applications matching `filters`
    fn count(&self, filters: ApplicationsSearchTerms) -> RepoResult<i64>;

    /// Creates new application
    fn create(&self, payload: NewMembershipApplication) -> RepoResult<MembershipApplication>;

    /// Stamps a review decision onto an application
    fn review(&self, application_id: i32, payload: ReviewedApplication) -> RepoResult<MembershipApplication>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> MembershipApplicationsRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<MembershipApplication>>) -> Self {
        Self { db_conn, acl }
    }

    fn execute_query<Ty: Send + 'static, U: LoadQuery<T, Ty> + Send + 'static>(&self, query: U) -> RepoResult<Ty> {
        query.get_result::<Ty>(self.db_conn).map_err(From::from)
    }

    fn filtered_query(filters: ApplicationsSearchTerms) -> ::schema::membership_applications::BoxedQuery<'a, Pg> {
        let mut query = membership_applications.into_boxed();

        if let Some(status_arg) = filters.status {
            query = query.filter(status.eq(status_arg));
        }

        query
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> MembershipApplicationsRepo
    for MembershipApplicationsRepoImpl<'a, T>
{
    /// Find specific application by ID
    fn find(&self, application_id_arg: i32) -> RepoResult<Option<MembershipApplication>> {
        debug!("Find in membership applications with id {}.", application_id_arg);
        let query = membership_applications.find(application_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|application: Option<MembershipApplication>| {
                if let Some(ref application) = application {
                    acl::check(&*self.acl, Resource::MembershipApplications, Action::Read, self, Some(application))?;
                };
                Ok(application)
            })
            .map_err(|e: FailureError| {
                e.context(format!("Find membership application with id: {} error occured", application_id_arg))
                    .into()
            })
    }

    /// Returns one page of applications matching `filters`, newest first
    fn search(&self, filters: ApplicationsSearchTerms, skip: i64, count: i64) -> RepoResult<Vec<MembershipApplication>> {
        debug!(
            "Search in membership applications with filters {:?}, skip {}, count {}.",
            filters, skip, count
        );
        acl::check(&*self.acl, Resource::MembershipApplications, Action::Read, self, None)
            .and_then(|_| {
                let query = Self::filtered_query(filters.clone())
                    .order((created_at.desc(), id.desc()))
                    .offset(skip)
                    .limit(count);

                query.get_results(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!("Search in membership applications with filters {:?} error occured.", filters))
                    .into()
            })
    }

    /// Counts applications matching `filters`
    fn count(&self, filters: ApplicationsSearchTerms) -> RepoResult<i64> {
        debug!("Count membership applications with filters {:?}.", filters);
        acl::check(&*self.acl, Resource::MembershipApplications, Action::Read, self, None)
            .and_then(|_| Self::filtered_query(filters.clone()).count().get_result(self.db_conn).map_err(From::from))
            .map_err(|e: FailureError| {
                e.context(format!("Count membership applications with filters {:?} error occured.", filters))
                    .into()
            })
    }

    /// Creates new application
    fn create(&self, payload: NewMembershipApplication) -> RepoResult<MembershipApplication> {
        debug!("Create membership application {:?}.", payload);
        acl::check(&*self.acl, Resource::MembershipApplications, Action::Create, self, None)
            .and_then(|_| {
                let query_application = diesel::insert_into(membership_applications).values(&payload);
                query_application.get_result::<MembershipApplication>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| e.context(format!("Create membership application {:?} error occured.", payload)).into())
    }

    /// Stamps a review decision onto an application
    fn review(&self, application_id_arg: i32, payload: ReviewedApplication) -> RepoResult<MembershipApplication> {
        debug!("Review membership application {} with {:?}.", application_id_arg, payload);
        self.execute_query(membership_applications.find(application_id_arg))
            .and_then(|application: MembershipApplication| {
                acl::check(&*self.acl, Resource::MembershipApplications, Action::Update, self, Some(&application))
            })
            .and_then(|_| {
                let filter = membership_applications.filter(id.eq(application_id_arg));

                let query = diesel::update(filter).set(&payload);
                query.get_result::<MembershipApplication>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!(
                    "Review membership application {} with {:?} error occured.",
                    application_id_arg, payload
                ))
                .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, MembershipApplication>
    for MembershipApplicationsRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&MembershipApplication>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(application) = obj {
                    application.user_id == user_id_arg
                } else {
                    false
                }
            }
        }
    }
}
