//! `Controller` is a top layer that handles all http-related
//! stuff like reading bodies, parsing params, forming a response.
//! Basically it provides inputs to `Service` layer and converts outputs
//! of `Service` layer to http responses

pub mod app;
pub mod context;
pub mod routes;
pub mod types;
pub mod utils;

use std::sync::Arc;

use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use futures::future;
use futures::Future;
use hyper::server::Request;
use hyper::{Delete, Get, Post, Put};
use r2d2::ManageConnection;

use self::context::{DynamicContext, StaticContext};
use self::routes::{create_route_parser, Route, RouteParser};
use self::types::ControllerFuture;
use self::utils::*;
use errors::Error;
use models::*;
use repos::repo_factory::ReposFactory;
use services::categories::CategoriesService;
use services::companies::CompaniesService;
use services::membership::MembershipService;
use services::products::ProductsService;
use services::rfqs::RfqsService;
use services::users::UsersService;
use services::Service;

/// Controller handles route parsing and calling `Service` layer
pub struct ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub static_context: StaticContext<T, M, F>,
    pub route_parser: Arc<RouteParser>,
}

impl<T, M, F> ControllerImpl<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    /// Create a new controller based on static context
    pub fn new(static_context: StaticContext<T, M, F>) -> Self {
        let route_parser = Arc::new(create_route_parser());
        Self {
            static_context,
            route_parser,
        }
    }

    /// Handle a request and get future response
    pub fn call(&self, req: Request) -> ControllerFuture {
        let user_id = user_id_from_headers(req.headers(), &self.static_context.config.jwt.secret_key);
        if let Some(user_id) = user_id {
            debug!("Request from user with id {}.", user_id);
        }
        let dynamic_context = DynamicContext::new(user_id);
        let service = Service::new(self.static_context.clone(), dynamic_context);

        let (method, uri, _, _, body) = req.deconstruct();
        let params = query_params(uri.query().unwrap_or_default());

        match (&method, self.route_parser.test(uri.path())) {
            // GET /healthcheck
            (&Get, Some(Route::Healthcheck)) => serialize_future(Ok::<String, Error>("Ok".to_string())),

            // GET /products
            (&Get, Some(Route::Products)) => match parse_products_search_terms(&params) {
                Ok(terms) => {
                    let pagination = parse_pagination(&params);
                    serialize_future(service.list_products(terms, pagination))
                }
                Err(e) => Box::new(future::err(e)),
            },

            // GET /products/<product_id>
            (&Get, Some(Route::Product(product_id))) => serialize_future(service.get_product(product_id).and_then(move |product| {
                product.ok_or_else(|| format_err!("Product {} not found", product_id).context(Error::NotFound).into())
            })),

            // POST /products
            (&Post, Some(Route::Products)) => {
                serialize_future(parse_body::<NewProduct>(body).and_then(move |new_product| service.create_product(new_product)))
            }

            // PUT /products/<product_id>
            (&Put, Some(Route::Product(product_id))) => serialize_future(
                parse_body::<UpdateProduct>(body).and_then(move |update_product| service.update_product(product_id, update_product)),
            ),

            // DELETE /products/<product_id>
            (&Delete, Some(Route::Product(product_id))) => serialize_future(service.deactivate_product(product_id)),

            // GET /companies
            (&Get, Some(Route::Companies)) => match parse_companies_search_terms(&params) {
                Ok(terms) => {
                    let pagination = parse_pagination(&params);
                    serialize_future(service.list_companies(terms, pagination))
                }
                Err(e) => Box::new(future::err(e)),
            },

            // GET /companies/<company_id>
            (&Get, Some(Route::Company(company_id))) => serialize_future(service.get_company(company_id).and_then(move |company| {
                company.ok_or_else(|| format_err!("Company {} not found", company_id).context(Error::NotFound).into())
            })),

            // POST /companies
            (&Post, Some(Route::Companies)) => serialize_future(
                parse_body::<NewCompanyPayload>(body)
                    .and_then(move |payload| service.create_company(payload.company, payload.category_ids)),
            ),

            // PUT /companies/<company_id>
            (&Put, Some(Route::Company(company_id))) => serialize_future(
                parse_body::<UpdateCompany>(body).and_then(move |update_company| service.update_company(company_id, update_company)),
            ),

            // GET /categories
            (&Get, Some(Route::Categories)) => serialize_future(service.list_categories()),

            // GET /categories/<category_id>
            (&Get, Some(Route::Category(category_id))) => {
                serialize_future(service.get_category(category_id).and_then(move |category| {
                    category.ok_or_else(|| format_err!("Category {} not found", category_id).context(Error::NotFound).into())
                }))
            }

            // POST /categories
            (&Post, Some(Route::Categories)) => {
                serialize_future(parse_body::<NewCategory>(body).and_then(move |new_category| service.create_category(new_category)))
            }

            // PUT /categories/<category_id>
            (&Put, Some(Route::Category(category_id))) => serialize_future(
                parse_body::<UpdateCategory>(body).and_then(move |update_category| service.update_category(category_id, update_category)),
            ),

            // GET /rfq
            (&Get, Some(Route::Rfqs)) => match parse_rfqs_search_terms(&params) {
                Ok(terms) => {
                    let pagination = parse_pagination(&params);
                    serialize_future(service.list_rfqs(terms, pagination))
                }
                Err(e) => Box::new(future::err(e)),
            },

            // GET /rfq/<rfq_id>
            (&Get, Some(Route::Rfq(rfq_id))) => serialize_future(service.get_rfq(rfq_id).and_then(move |rfq| {
                rfq.ok_or_else(|| format_err!("Rfq {} not found", rfq_id).context(Error::NotFound).into())
            })),

            // POST /rfq
            (&Post, Some(Route::Rfqs)) => {
                serialize_future(parse_body::<NewRfq>(body).and_then(move |new_rfq| service.create_rfq(new_rfq)))
            }

            // PUT /rfq/<rfq_id>
            (&Put, Some(Route::Rfq(rfq_id))) => {
                serialize_future(parse_body::<UpdateRfq>(body).and_then(move |update_rfq| service.update_rfq(rfq_id, update_rfq)))
            }

            // POST /rfq/<rfq_id>/responses
            (&Post, Some(Route::RfqResponses(rfq_id))) => {
                serialize_future(parse_body::<NewRfqResponse>(body).and_then(move |response| service.respond_to_rfq(rfq_id, response)))
            }

            // PUT /rfq/<rfq_id>/responses/<response_id>
            (&Put, Some(Route::RfqResponse(rfq_id, response_id))) => serialize_future(
                parse_body::<UpdateRfqResponse>(body)
                    .and_then(move |update_response| service.update_rfq_response(rfq_id, response_id, update_response)),
            ),

            // GET /membership/applications
            (&Get, Some(Route::MembershipApplications)) => match parse_applications_search_terms(&params) {
                Ok(terms) => {
                    let pagination = parse_pagination(&params);
                    serialize_future(service.list_applications(terms, pagination))
                }
                Err(e) => Box::new(future::err(e)),
            },

            // POST /membership/applications
            (&Post, Some(Route::MembershipApplications)) => serialize_future(
                parse_body::<NewMembershipApplication>(body).and_then(move |application| service.create_application(application)),
            ),

            // PUT /membership/applications/<application_id>
            (&Put, Some(Route::MembershipApplication(application_id))) => serialize_future(
                parse_body::<ReviewPayload>(body).and_then(move |review| service.review_application(application_id, review.decision)),
            ),

            // GET /users/me
            (&Get, Some(Route::CurrentUser)) => serialize_future(service.current_user()),

            // Fallback
            _ => Box::new(future::err(
                format_err!("Url: {}, method: {} not found", uri.path(), method)
                    .context(Error::NotFound)
                    .into(),
            )),
        }
    }
}
