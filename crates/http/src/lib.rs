//! The protocol half of a small embedded HTTP server.
//!
//! This crate parses one request per connection, hands it to a [`handler::Handler`] together
//! with a one-shot [`protocol::Response`] writer, and closes the connection afterwards. It is
//! sized for constrained targets: bodies are capped (4 KiB by default), the head is limited to
//! 8 KiB, and every response carries `Connection: close`.
//!
//! # Example
//!
//! ```no_run
//! use express_http::connection::HttpConnection;
//! use express_http::handler::{BoxError, make_handler};
//! use express_http::protocol::{Request, Response};
//! use futures::FutureExt;
//! use tokio::net::TcpListener;
//! use tracing::{Level, error, info, warn};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = make_handler(|req, res| hello_world(req, res).boxed());
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let (reader, writer) = tcp_stream.into_split();
//!         if let Err(e) = HttpConnection::new(reader, writer).process(&handler).await {
//!             error!(cause = %e, "request failed, connection shutdown");
//!         }
//!     }
//! }
//!
//! async fn hello_world(req: &mut Request, res: &mut Response) -> Result<(), BoxError> {
//!     info!(path = req.path(), "request path");
//!     res.text("Hello World!\r\n").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: the per-connection lifecycle and its limits
//! - [`protocol`]: request, response, method and error types
//! - [`codec`]: request decoding, response head encoding and percent-decoding
//! - [`handler`]: the handler trait
//!
//! # Limitations
//!
//! - HTTP/1.x, one request per connection, no keep-alive
//! - no chunked transfer encoding; bodies are delimited by `Content-Length`
//! - no TLS

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
