//! The seam between a connection and the application.
//!
//! A [`Handler`] receives the fully read request and the response writer. Returning an error
//! makes the connection answer `500` unless the handler already sent something.

use std::error::Error;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::protocol::{Request, Response};

pub type BoxError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<(), BoxError>;
}

#[async_trait]
impl<H> Handler for std::sync::Arc<H>
where
    H: Handler + ?Sized,
{
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
        (**self).call(req, res).await
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
        (self.f)(req, res).await
    }
}

/// Wraps a closure returning a boxed future as a [`Handler`].
///
/// ```
/// use express_http::handler::{BoxError, make_handler};
/// use express_http::protocol::{Request, Response};
/// use futures::FutureExt;
///
/// async fn hello(_req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
///     res.text("hello").await?;
///     Ok(())
/// }
///
/// let handler = make_handler(|req, res| hello(req, res).boxed());
/// ```
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    HandlerFn { f }
}
