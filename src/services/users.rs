//! Users Services, reads the account behind the current request
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;

use super::types::ServiceFuture;
use errors::Error;
use models::User;
use repos::ReposFactory;
use services::Service;

pub trait UsersService {
    /// Returns the authenticated user
    fn current_user(&self) -> ServiceFuture<User>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > UsersService for Service<T, M, F>
{
    /// Returns the authenticated user
    fn current_user(&self) -> ServiceFuture<User> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let users_repo = repo_factory.create_users_repo(&*conn, Some(user_id));
                users_repo
                    .find(user_id)?
                    .ok_or_else(|| format_err!("User {} not found", user_id).context(Error::NotFound).into())
            }
            .map_err(|e: FailureError| e.context("Service Users, current_user endpoint error occured.").into())
        })
    }
}
