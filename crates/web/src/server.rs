//! The server: owns the route table, the middleware chain and the content store, and runs the
//! accept loop.
//!
//! Connections are served strictly one at a time on the accepting task. For each request the
//! server runs, in order: middleware, the first matching route, the content store, and finally
//! the not-found handler. The connection then makes sure a response went out and closes.

use std::future;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use async_trait::async_trait;
use bytes::Bytes;
use express_http::connection::HttpConnection;
use express_http::handler::{BoxError, Handler};
use express_http::protocol::{HttpError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::content::ContentStore;
use crate::handler::RequestHandler;
use crate::middleware::{Middleware, MiddlewareChain, MiddlewareChainBuilder};
use crate::router::{RouteError, Router, RouterItemBuilder};

pub struct ServerBuilder {
    config: ServerConfig,
    router: Option<Router>,
    routes: Vec<(String, RouterItemBuilder)>,
    middleware: MiddlewareChainBuilder,
    content: ContentStore,
    not_found: Option<Box<dyn RequestHandler>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            router: None,
            routes: Vec::new(),
            middleware: MiddlewareChain::builder(),
            content: ContentStore::new(),
            not_found: None,
        }
    }

    /// Replaces the whole configuration, including the address.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Adds a route after the ones of the configured [`Router`].
    pub fn route(mut self, path: impl Into<String>, item_builder: RouterItemBuilder) -> Self {
        self.routes.push((path.into(), item_builder));
        self
    }

    pub fn use_all<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware = self.middleware.use_all(middleware);
        self
    }

    pub fn use_at<M: Middleware + 'static>(mut self, prefix: impl Into<String>, middleware: M) -> Self {
        self.middleware = self.middleware.use_at(prefix, middleware);
        self
    }

    /// Serves `data` at exactly `path` when no route matches it.
    pub fn serve_content(mut self, path: impl Into<String>, data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.content.add(path, data, content_type);
        self
    }

    /// Replaces the default `404 Not Found: <path>` answer.
    pub fn not_found(mut self, request_handler: impl RequestHandler + 'static) -> Self {
        self.not_found = Some(Box::new(request_handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = resolve(&self.config.address)?;

        let mut router = self.router.unwrap_or_default();
        for (path, item) in self.routes {
            router.register_item(&path, item)?;
        }

        Ok(Server {
            config: self.config,
            address,
            router,
            middleware: self.middleware.build(),
            content: self.content,
            not_found: self.not_found,
        })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder").field("config", &self.config).field("router", &self.router).finish_non_exhaustive()
    }
}

fn resolve(address: &str) -> Result<Vec<SocketAddr>, ServerBuildError> {
    let addrs = address
        .to_socket_addrs()
        .map_err(|source| ServerBuildError::InvalidAddress { address: address.to_owned(), source })?
        .collect::<Vec<_>>();

    if addrs.is_empty() {
        return Err(ServerBuildError::InvalidAddress {
            address: address.to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing"),
        });
    }
    Ok(addrs)
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("invalid address {address}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Route(#[from] RouteError),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("bind {address:?} failed: {source}")]
    Bind {
        address: Vec<SocketAddr>,
        #[source]
        source: io::Error,
    },
}

pub struct Server {
    config: ServerConfig,
    address: Vec<SocketAddr>,
    router: Router,
    middleware: MiddlewareChain,
    content: ContentStore,
    not_found: Option<Box<dyn RequestHandler>>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Binds the configured address and serves connections until the process exits.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(future::pending()).await
    }

    /// Like [`Server::start`], but stops accepting once `signal` resolves.
    pub async fn start_with_shutdown<S>(&self, signal: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()>,
    {
        let tcp_listener = TcpListener::bind(self.address.as_slice())
            .await
            .map_err(|source| ServerError::Bind { address: self.address.clone(), source })?;

        self.serve(tcp_listener, signal).await;
        Ok(())
    }

    /// Runs the accept loop on an already bound listener until `signal` resolves.
    pub async fn serve<S>(&self, tcp_listener: TcpListener, signal: S)
    where
        S: Future<Output = ()>,
    {
        match tcp_listener.local_addr() {
            Ok(local_addr) => info!(%local_addr, "start listening"),
            Err(e) => warn!(cause = %e, "start listening at unknown address"),
        }

        tokio::pin!(signal);
        loop {
            let (tcp_stream, remote_addr) = select! {
                biased;
                _ = &mut signal => {
                    info!("shutdown signal received, stop accepting");
                    return;
                }
                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            debug!(%remote_addr, "accepted connection");
            match self.handle_connection(tcp_stream).await {
                Ok(_) => {
                    info!(%remote_addr, "finished process, connection shutdown");
                }
                Err(e) => {
                    error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                }
            }
        }
    }

    /// Serves the single request carried by an already accepted stream.
    pub async fn handle_connection<S>(&self, stream: S) -> Result<(), HttpError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let connection = HttpConnection::with_config(reader, writer, self.config.connection.clone());
        connection.process(self).await
    }

    async fn fallback(&self, req: &Request, res: &mut Response) -> Result<(), BoxError> {
        if res.is_sent() {
            return Ok(());
        }

        if let Some(content) = self.content.get(req.path()) {
            debug!(path = req.path(), content_type = content.content_type(), "serving stored content");
            res.send(content.data(), content.content_type()).await?;
            return Ok(());
        }

        match &self.not_found {
            Some(not_found) => not_found.invoke(req, res).await,
            None => {
                debug!(path = req.path(), "no route or content");
                res.code(404).text(format!("Not Found: {}", req.path())).await?;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.address)
            .field("router", &self.router)
            .field("middleware", &self.middleware)
            .field("content", &self.content)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for Server {
    async fn call(&self, req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
        if !self.middleware.run(req, res).await? {
            return Ok(());
        }

        match self.router.at(req.method(), req.path()) {
            Some(route_match) => {
                let (handler, params) = route_match.into_parts();
                req.set_params(params);
                handler.invoke(req, res).await
            }
            None => self.fallback(req, res).await,
        }
    }
}
