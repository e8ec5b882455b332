//! Middleware run before routing.
//!
//! Each entry has an optional path prefix; an entry applies when its prefix is empty or a
//! literal prefix of the request path. Applicable entries run in registration order and may
//! modify the request or answer it directly. Returning `false`, or sending the response, stops
//! the chain and skips routing.

use std::fmt;

use async_trait::async_trait;
use express_http::handler::BoxError;
use express_http::protocol::{Request, Response};
use futures::future::BoxFuture;
use tracing::debug;

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Returns whether processing should continue.
    async fn handle(&self, req: &mut Request, res: &mut Response) -> Result<bool, BoxError>;
}

#[derive(Debug)]
pub struct MiddlewareFn<F> {
    f: F,
}

/// Wraps a closure returning a boxed future as a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<bool, BoxError>> + Send + Sync,
{
    MiddlewareFn { f }
}

#[async_trait]
impl<F> Middleware for MiddlewareFn<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Result<bool, BoxError>> + Send + Sync,
{
    async fn handle(&self, req: &mut Request, res: &mut Response) -> Result<bool, BoxError> {
        (self.f)(req, res).await
    }
}

struct MiddlewareEntry {
    prefix: String,
    middleware: Box<dyn Middleware>,
}

impl MiddlewareEntry {
    #[inline]
    fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[derive(Default)]
pub struct MiddlewareChain {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareChain {
    pub fn builder() -> MiddlewareChainBuilder {
        MiddlewareChainBuilder::new()
    }

    /// Runs every applicable middleware. `Ok(false)` means the request was handled here.
    pub async fn run(&self, req: &mut Request, res: &mut Response) -> Result<bool, BoxError> {
        for entry in &self.entries {
            if !entry.applies_to(req.path()) {
                continue;
            }

            let proceed = entry.middleware.handle(req, res).await?;
            if !proceed || res.is_sent() {
                debug!(path = req.path(), prefix = %entry.prefix, proceed, sent = res.is_sent(), "middleware halted the request");
                return Ok(false);
            }
        }
        Ok(true)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|entry| &entry.prefix)).finish()
    }
}

#[derive(Default)]
pub struct MiddlewareChainBuilder {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareChainBuilder {
    fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Adds a middleware that runs for every path.
    pub fn use_all<M: Middleware + 'static>(self, middleware: M) -> Self {
        self.use_at("", middleware)
    }

    /// Adds a middleware that runs for paths starting with `prefix`.
    pub fn use_at<M: Middleware + 'static>(mut self, prefix: impl Into<String>, middleware: M) -> Self {
        self.entries.push(MiddlewareEntry { prefix: prefix.into(), middleware: Box::new(middleware) });
        self
    }

    pub fn build(self) -> MiddlewareChain {
        MiddlewareChain { entries: self.entries }
    }
}

impl fmt::Debug for MiddlewareChainBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|entry| &entry.prefix)).finish()
    }
}
