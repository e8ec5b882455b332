//! Ordered route table.
//!
//! Routes are tried in registration order and the first one whose method and path template
//! both match wins. A route registered with [`Method::Any`] (see [`all`]) matches every method.
//!
//! ```
//! use express_web::router::{Router, get, post};
//! use express_web::{BoxError, Request, Response, handler_fn};
//! use express_http::protocol::Method;
//! use futures::FutureExt;
//!
//! async fn show_user(req: &Request, res: &mut Response) -> Result<(), BoxError> {
//!     let id = req.param("id").unwrap_or_default();
//!     res.text(format!("user {id}")).await?;
//!     Ok(())
//! }
//!
//! let router = Router::builder()
//!     .route("/user/:id", get(handler_fn(|req, res| show_user(req, res).boxed())))
//!     .route("/user/:id", post(handler_fn(|req, res| show_user(req, res).boxed())))
//!     .build()
//!     .unwrap();
//!
//! let matched = router.at(Method::Get, "/user/42").unwrap();
//! assert_eq!(matched.params(), [("id".to_string(), "42".to_string())]);
//! ```

pub mod pattern;

use std::fmt;

use express_http::protocol::Method;
use thiserror::Error;
use tracing::trace;

use crate::handler::RequestHandler;
use pattern::{PathPattern, PatternError};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid route {method} {path}: {source}")]
    InvalidPattern {
        method: Method,
        path: String,
        #[source]
        source: PatternError,
    },
}

pub struct Router {
    routes: Vec<Route>,
}

pub struct Route {
    method: Method,
    path: String,
    pattern: PathPattern,
    handler: Box<dyn RequestHandler>,
}

/// The route selected for a request and its extracted parameters.
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: Vec<(String, String)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Appends a route; it only matches requests no earlier route matched.
    pub fn register<H>(&mut self, method: Method, path: &str, handler: H) -> Result<(), RouteError>
    where
        H: RequestHandler + 'static,
    {
        self.register_boxed(method, path, Box::new(handler))
    }

    pub(crate) fn register_item(&mut self, path: &str, item: RouterItemBuilder) -> Result<(), RouteError> {
        let (method, handler) = item.into_parts();
        self.register_boxed(method, path, handler)
    }

    fn register_boxed(&mut self, method: Method, path: &str, handler: Box<dyn RequestHandler>) -> Result<(), RouteError> {
        let pattern = PathPattern::parse(path).map_err(|source| RouteError::InvalidPattern { method, path: path.to_owned(), source })?;
        trace!(%method, path, params = ?pattern.param_names(), "register route");
        self.routes.push(Route { method, path: path.to_owned(), pattern, handler });
        Ok(())
    }

    /// Finds the first route accepting `method` and matching `path`.
    pub fn at(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().filter(|route| route.method.accepts(method)).find_map(|route| {
            let params = route.pattern.params(path)?;
            trace!(%method, path, route = %route.path, "route matched");
            Some(RouteMatch { route, params })
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes.iter()).finish()
    }
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("method", &self.method).field("path", &self.path).finish_non_exhaustive()
    }
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    pub fn handler(&self) -> &'router dyn RequestHandler {
        self.route.handler()
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn into_parts(self) -> (&'router dyn RequestHandler, Vec<(String, String)>) {
        (self.route.handler(), self.params)
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("route", &self.route).field("params", &self.params).finish()
    }
}

/// Collects routes and compiles their templates in [`RouterBuilder::build`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    items: Vec<(String, RouterItemBuilder)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn route(mut self, route: impl Into<String>, item_builder: RouterItemBuilder) -> Self {
        self.items.push((route.into(), item_builder));
        self
    }

    /// Compiles every template, keeping registration order.
    pub fn build(self) -> Result<Router, RouteError> {
        let mut router = Router::new();
        for (path, item) in self.items {
            router.register_item(&path, item)?;
        }
        Ok(router)
    }
}

/// A handler paired with the method it answers, waiting for a path.
pub struct RouterItemBuilder {
    method: Method,
    handler: Box<dyn RequestHandler>,
}

impl RouterItemBuilder {
    pub fn new<H: RequestHandler + 'static>(method: Method, handler: H) -> Self {
        Self { method, handler: Box::new(handler) }
    }

    pub(crate) fn into_parts(self) -> (Method, Box<dyn RequestHandler>) {
        (self.method, self.handler)
    }
}

impl fmt::Debug for RouterItemBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItemBuilder").field("method", &self.method).finish_non_exhaustive()
    }
}

macro_rules! method_router {
    ($method:ident, $variant:ident) => {
        pub fn $method<H: RequestHandler + 'static>(handler: H) -> RouterItemBuilder {
            RouterItemBuilder::new(Method::$variant, handler)
        }
    };
}

method_router!(get, Get);
method_router!(post, Post);
method_router!(put, Put);
method_router!(delete, Delete);
method_router!(patch, Patch);
method_router!(options, Options);
method_router!(head, Head);
method_router!(all, Any);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler_fn;
    use express_http::handler::BoxError;
    use express_http::protocol::{Request, Response};
    use futures::FutureExt;

    async fn noop(_req: &Request, _res: &mut Response) -> Result<(), BoxError> {
        Ok(())
    }

    fn handler() -> impl RequestHandler {
        handler_fn(|req, res| noop(req, res).boxed())
    }

    fn router() -> Router {
        Router::builder()
            .route("/", get(handler()))
            .route("/user/:id", get(handler()))
            .route("/user/:id", post(handler()))
            .route("/user/me", get(handler()))
            .route("/any/:thing", all(handler()))
            .build()
            .unwrap()
    }

    fn matched_path(router: &Router, method: Method, path: &str) -> Option<(String, Vec<(String, String)>)> {
        router.at(method, path).map(|matched| (matched.route().path().to_string(), matched.params().to_vec()))
    }

    #[test]
    fn test_route_get() {
        let router = router();
        let (path, params) = matched_path(&router, Method::Get, "/user/42").unwrap();
        assert_eq!(path, "/user/:id");
        assert_eq!(params, vec![("id".to_string(), "42".to_string())]);
    }

    #[test]
    fn test_first_registration_wins() {
        let router = router();
        let (path, params) = matched_path(&router, Method::Get, "/user/me").unwrap();
        assert_eq!(path, "/user/:id");
        assert_eq!(params, vec![("id".to_string(), "me".to_string())]);
    }

    #[test]
    fn test_method_must_match() {
        let router = router();
        assert!(router.at(Method::Post, "/user/42").is_some());
        assert!(router.at(Method::Delete, "/user/42").is_none());
        assert!(router.at(Method::Post, "/").is_none());
    }

    #[test]
    fn test_any_matches_every_method() {
        let router = router();
        for method in [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Patch, Method::Options, Method::Head] {
            assert!(router.at(method, "/any/thing").is_some(), "{method} should match");
        }
    }

    #[test]
    fn test_trailing_slash_same_params() {
        let router = router();
        let without = router.at(Method::Get, "/user/42").unwrap();
        let with = router.at(Method::Get, "/user/42/").unwrap();
        assert_eq!(without.params(), with.params());
    }

    #[test]
    fn test_no_route() {
        let router = router();
        assert!(router.at(Method::Get, "/missing").is_none());
    }

    #[test]
    fn test_invalid_template() {
        let result = Router::builder().route("user/:id", get(handler())).build();
        assert!(matches!(result, Err(RouteError::InvalidPattern { method: Method::Get, .. })));

        let mut router = Router::new();
        let result = router.register(Method::Post, "/user/:", handler());
        assert!(matches!(result, Err(RouteError::InvalidPattern { source: PatternError::EmptyParamName { .. }, .. })));
        assert!(router.is_empty());
    }
}
