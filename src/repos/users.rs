//! Users repo, read side of user accounts for roles, ownership and rfq buyers
use diesel;
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_dsl::RunQueryDsl;
use diesel::Connection;
use failure::Error as FailureError;

use models::authorization::*;
use models::{User, UserRole};
use repos::acl;
use repos::legacy_acl::*;
use repos::types::{RepoAcl, RepoResult};
use schema::users::dsl::*;

/// Users repository, responsible for reading user accounts
pub struct UsersRepoImpl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> {
    pub db_conn: &'a T,
    pub acl: Box<RepoAcl<User>>,
}

pub trait UsersRepo {
    /// Find specific user by ID
    fn find(&self, user_id: i32) -> RepoResult<Option<User>>;

    /// Find users by IDs
    fn find_many(&self, user_ids: Vec<i32>) -> RepoResult<Vec<User>>;

    /// Returns roles of a user; a missing user has no roles
    fn roles_for_user(&self, user_id: i32) -> RepoResult<Vec<UserRole>>;

    /// Links a user to a company
    fn set_company(&self, user_id: i32, company_id: i32) -> RepoResult<User>;
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UsersRepoImpl<'a, T> {
    pub fn new(db_conn: &'a T, acl: Box<RepoAcl<User>>) -> Self {
        Self { db_conn, acl }
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> UsersRepo for UsersRepoImpl<'a, T> {
    /// Find specific user by ID
    fn find(&self, user_id_arg: i32) -> RepoResult<Option<User>> {
        debug!("Find in users with id {}.", user_id_arg);
        let query = users.find(user_id_arg);
        query
            .get_result(self.db_conn)
            .optional()
            .map_err(From::from)
            .and_then(|user: Option<User>| {
                if let Some(ref user) = user {
                    acl::check(&*self.acl, Resource::Users, Action::Read, self, Some(user))?;
                };
                Ok(user)
            })
            .map_err(|e: FailureError| e.context(format!("Find user with id: {} error occured", user_id_arg)).into())
    }

    /// Find users by IDs
    fn find_many(&self, user_ids: Vec<i32>) -> RepoResult<Vec<User>> {
        debug!("Find in users {:?}.", user_ids);
        let query = users.filter(id.eq_any(user_ids.clone())).order(id);

        query
            .get_results(self.db_conn)
            .map_err(From::from)
            .and_then(|users_res: Vec<User>| {
                for user in &users_res {
                    acl::check(&*self.acl, Resource::Users, Action::Read, self, Some(user))?;
                }
                Ok(users_res.clone())
            })
            .map_err(|e: FailureError| e.context(format!("Find in users {:?} error occured.", user_ids)).into())
    }

    /// Returns roles of a user; a missing user has no roles
    fn roles_for_user(&self, user_id_arg: i32) -> RepoResult<Vec<UserRole>> {
        debug!("Get roles of user {}.", user_id_arg);
        users
            .filter(id.eq(user_id_arg))
            .select(role)
            .get_result::<UserRole>(self.db_conn)
            .optional()
            .map(|role_res| role_res.into_iter().collect())
            .map_err(|e| {
                FailureError::from(e)
                    .context(format!("Get roles of user {} error occured.", user_id_arg))
                    .into()
            })
    }

    /// Links a user to a company
    fn set_company(&self, user_id_arg: i32, company_id_arg: i32) -> RepoResult<User> {
        debug!("Link user {} to company {}.", user_id_arg, company_id_arg);
        users
            .find(user_id_arg)
            .get_result::<User>(self.db_conn)
            .map_err(From::from)
            .and_then(|user: User| acl::check(&*self.acl, Resource::Users, Action::Update, self, Some(&user)))
            .and_then(|_| {
                let filter = users.filter(id.eq(user_id_arg));
                let query = diesel::update(filter).set(company_id.eq(company_id_arg));
                query.get_result::<User>(self.db_conn).map_err(From::from)
            })
            .map_err(|e: FailureError| {
                e.context(format!("Link user {} to company {} error occured.", user_id_arg, company_id_arg))
                    .into()
            })
    }
}

impl<'a, T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> CheckScope<Scope, User>
    for UsersRepoImpl<'a, T>
{
    fn is_in_scope(&self, user_id_arg: i32, scope: &Scope, obj: Option<&User>) -> bool {
        match *scope {
            Scope::All => true,
            Scope::Owned => {
                if let Some(user) = obj {
                    user.id == user_id_arg
                } else {
                    false
                }
            }
        }
    }
}
