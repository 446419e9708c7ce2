use failure::Error as FailureError;
use futures::Future;

/// Controller layer Future
pub type ControllerFuture = Box<Future<Item = String, Error = FailureError>>;
