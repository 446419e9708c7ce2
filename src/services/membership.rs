//! Membership Services, presents operations with membership applications
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use r2d2::ManageConnection;
use validator::Validate;

use super::types::ServiceFuture;
use errors::Error;
use models::*;
use repos::ReposFactory;
use services::Service;

pub trait MembershipService {
    /// Returns one page of membership applications with applicants attached
    fn list_applications(
        &self,
        terms: ApplicationsSearchTerms,
        pagination: PaginationParams,
    ) -> ServiceFuture<Page<MembershipApplicationListItem>>;
    /// Creates an application for the authenticated user
    fn create_application(&self, payload: NewMembershipApplication) -> ServiceFuture<MembershipApplication>;
    /// Approves or rejects an application; approval applies the requested
    /// tier to the company of the applicant when one exists
    fn review_application(&self, application_id: i32, decision: ApplicationDecision) -> ServiceFuture<MembershipApplication>;
}

impl<
        T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
        M: ManageConnection<Connection = T>,
        F: ReposFactory<T>,
    > MembershipService for Service<T, M, F>
{
    /// Returns one page of membership applications with applicants attached
    fn list_applications(
        &self,
        terms: ApplicationsSearchTerms,
        pagination: PaginationParams,
    ) -> ServiceFuture<Page<MembershipApplicationListItem>> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let applications_repo = repo_factory.create_membership_applications_repo(&*conn, user_id);
                let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);

                let total = applications_repo.count(terms.clone())?;
                let page_applications = applications_repo.search(terms, pagination.skip(), pagination.page_size)?;

                let user_ids = page_applications.iter().map(|application| application.user_id).collect();
                let users = users_repo.find_many(user_ids)?;

                let items = page_applications
                    .into_iter()
                    .filter_map(|application| {
                        users
                            .iter()
                            .find(|user| user.id == application.user_id)
                            .cloned()
                            .map(|user| MembershipApplicationListItem::new(application, user))
                    })
                    .collect();

                Ok(Page::new(items, total, pagination))
            }
            .map_err(|e: FailureError| e.context("Service Membership, list_applications endpoint error occured.").into())
        })
    }

    /// Creates an application for the authenticated user
    fn create_application(&self, payload: NewMembershipApplication) -> ServiceFuture<MembershipApplication> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let user_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let payload = NewMembershipApplication { user_id, ..payload };
                payload
                    .validate()
                    .map_err(|e| FailureError::from(Error::Validate(e)))?;

                let applications_repo = repo_factory.create_membership_applications_repo(&*conn, Some(user_id));
                applications_repo.create(payload)
            }
            .map_err(|e: FailureError| e.context("Service Membership, create_application endpoint error occured.").into())
        })
    }

    /// Approves or rejects an application
    fn review_application(&self, application_id: i32, decision: ApplicationDecision) -> ServiceFuture<MembershipApplication> {
        let repo_factory = self.static_context.repo_factory.clone();
        let user_id = self.dynamic_context.user_id;

        self.spawn_on_pool(move |conn| {
            {
                let reviewer_id = user_id.ok_or_else(|| format_err!("No user was provided").context(Error::Forbidden))?;

                let applications_repo = repo_factory.create_membership_applications_repo(&*conn, Some(reviewer_id));
                let users_repo = repo_factory.create_users_repo_with_sys_acl(&*conn);
                let companies_repo = repo_factory.create_companies_repo(&*conn, Some(reviewer_id));

                let application = applications_repo
                    .find(application_id)?
                    .ok_or_else(|| format_err!("Membership application {} not found", application_id).context(Error::NotFound))?;

                let status = match decision {
                    ApplicationDecision::Approve => ApplicationStatus::Approved,
                    ApplicationDecision::Reject => ApplicationStatus::Rejected,
                };

                conn.transaction::<MembershipApplication, FailureError, _>(move || {
                    let reviewed = applications_repo.review(
                        application_id,
                        ReviewedApplication {
                            status,
                            reviewer_id,
                            reviewed_at: ::chrono::Utc::now().naive_utc(),
                        },
                    )?;

                    if status == ApplicationStatus::Approved {
                        let applicant = users_repo.find(application.user_id)?;
                        if let Some(company_id) = applicant.and_then(|user| user.company_id) {
                            companies_repo.update(
                                company_id,
                                UpdateCompany {
                                    membership_tier: Some(reviewed.requested_tier),
                                    ..Default::default()
                                },
                            )?;
                        }
                    }

                    Ok(reviewed)
                })
            }
            .map_err(|e: FailureError| e.context("Service Membership, review_application endpoint error occured.").into())
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio_core::reactor::Core;

    use super::*;
    use models::*;
    use repos::repo_factory::tests::*;

    #[test]
    fn applications_are_listed_with_their_applicants() {
        let service = create_service(Some(MOCK_ADMIN_ID));
        let mut core = Core::new().unwrap();
        let page = core
            .run(service.list_applications(ApplicationsSearchTerms::default(), PaginationParams::default()))
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].user_email, "buyer@example.com".to_string());
    }

    #[test]
    fn status_filter_narrows_the_listing() {
        let service = create_service(Some(MOCK_ADMIN_ID));
        let mut core = Core::new().unwrap();
        let page = core
            .run(service.list_applications(
                ApplicationsSearchTerms {
                    status: Some(ApplicationStatus::Approved),
                },
                PaginationParams::default(),
            ))
            .unwrap();

        assert_eq!(page.total, 0);
        assert_eq!(page.items.len(), 0);
    }

    #[test]
    fn create_application_requires_a_user() {
        let service = create_service(None);
        let mut core = Core::new().unwrap();
        let result = core.run(service.create_application(NewMembershipApplication {
            user_id: 0,
            company_name: "Company".to_string(),
            requested_tier: MembershipTier::Gold,
            message: None,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn approval_stamps_the_reviewer() {
        let service = create_service(Some(MOCK_ADMIN_ID));
        let mut core = Core::new().unwrap();
        let reviewed = core.run(service.review_application(1, ApplicationDecision::Approve)).unwrap();

        assert_eq!(reviewed.status, ApplicationStatus::Approved);
        assert_eq!(reviewed.reviewer_id, Some(MOCK_ADMIN_ID));
        assert!(reviewed.reviewed_at.is_some());
    }
}
