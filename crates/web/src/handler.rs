use async_trait::async_trait;
use express_http::handler::BoxError;
use express_http::protocol::{Request, Response};
use futures::future::BoxFuture;

/// An application handler bound to a route.
///
/// Path parameters are already in the request when `invoke` runs.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: &Request, res: &mut Response) -> Result<(), BoxError>;
}

/// a closure holder which represents an async handler fn
#[derive(Debug)]
pub struct FnHandler<F> {
    f: F,
}

/// Wraps a closure returning a boxed future as a [`RequestHandler`].
///
/// ```
/// use express_web::handler_fn;
/// use express_web::{BoxError, Request, Response};
/// use futures::FutureExt;
///
/// async fn status(_req: &Request, res: &mut Response) -> Result<(), BoxError> {
///     res.json(r#"{"status":"ok"}"#).await?;
///     Ok(())
/// }
///
/// let handler = handler_fn(|req, res| status(req, res).boxed());
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> RequestHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a Request, &'a mut Response) -> BoxFuture<'a, Result<(), BoxError>> + Send + Sync,
{
    async fn invoke(&self, req: &Request, res: &mut Response) -> Result<(), BoxError> {
        (self.f)(req, res).await
    }
}
