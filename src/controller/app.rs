//! Application is the top-level hyper service that wraps the controller and
//! turns its output, successes and failures alike, into http responses
use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;
use failure::Error as FailureError;
use futures::future;
use futures::Future;
use hyper;
use hyper::header::{ContentLength, ContentType};
use hyper::server::{Request, Response, Service};
use hyper::StatusCode;
use r2d2::ManageConnection;
use serde_json;

use super::ControllerImpl;
use errors::{Error, ErrorMessage};
use repos::repo_factory::ReposFactory;

pub struct Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub controller: ControllerImpl<T, M, F>,
}

impl<T, M, F> Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    pub fn new(controller: ControllerImpl<T, M, F>) -> Self {
        Self { controller }
    }
}

impl<T, M, F> Service for Application<T, M, F>
where
    T: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static,
    M: ManageConnection<Connection = T>,
    F: ReposFactory<T>,
{
    type Request = Request;
    type Response = Response;
    type Error = hyper::Error;
    type Future = Box<Future<Item = Response, Error = hyper::Error>>;

    fn call(&self, req: Request) -> Self::Future {
        debug!("{} {}", req.method(), req.path());
        Box::new(self.controller.call(req).then(|result| match result {
            Ok(data) => future::ok(response_with_body(data)),
            Err(err) => {
                error!("Error processing request: {}", display_chain(&err));
                future::ok(response_with_error(&err))
            }
        }))
    }
}

fn response_with_body(body: String) -> Response {
    Response::new()
        .with_header(ContentLength(body.len() as u64))
        .with_header(ContentType::json())
        .with_body(body)
}

fn response_with_error(err: &FailureError) -> Response {
    let (code, message) = match err.iter_chain().filter_map(|fail| fail.downcast_ref::<Error>()).next() {
        Some(error) => (
            error.code(),
            ErrorMessage {
                code: error.code().as_u16(),
                description: error.to_string(),
                payload: error.payload(),
            },
        ),
        None => (
            StatusCode::InternalServerError,
            ErrorMessage {
                code: StatusCode::InternalServerError.as_u16(),
                description: "Internal server error".to_string(),
                payload: None,
            },
        ),
    };

    let body = serde_json::to_string(&message).unwrap_or_default();
    response_with_body(body).with_status(code)
}

fn display_chain(err: &FailureError) -> String {
    err.iter_chain().map(|fail| fail.to_string()).collect::<Vec<String>>().join(" | ")
}
