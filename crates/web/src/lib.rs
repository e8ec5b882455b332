//! An Express-style application layer for `express-http`.
//!
//! A [`Server`] owns three tables, filled at build time and read-only afterwards:
//!
//! - a [`Router`]: method plus path template (`/user/:id`), first match wins
//! - a [`MiddlewareChain`](middleware::MiddlewareChain): prefix-scoped hooks run before routing
//! - a [`ContentStore`](content::ContentStore): payloads served by exact path when no route matched
//!
//! # Example
//!
//! ```no_run
//! use express_web::router::get;
//! use express_web::{BoxError, Request, Response, Server, handler_fn};
//! use futures::FutureExt;
//!
//! async fn hello(req: &Request, res: &mut Response) -> Result<(), BoxError> {
//!     let name = req.query("name").unwrap_or("world");
//!     res.text(format!("hello {name}")).await?;
//!     Ok(())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::builder()
//!         .address("127.0.0.1:3000")
//!         .route("/", get(handler_fn(|req, res| hello(req, res).boxed())))
//!         .build()
//!         .unwrap();
//!
//!     server.start().await.unwrap();
//! }
//! ```

mod config;
mod handler;
mod server;

pub mod content;
pub mod middleware;
pub mod router;

pub use config::ServerConfig;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use handler::handler_fn;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
pub use server::ServerError;

pub use express_http::handler::BoxError;
pub use express_http::protocol::{Method, Request, Response};
