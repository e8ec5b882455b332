//! Per-connection request processing.
//!
//! [`HttpConnection`] takes one accepted stream through its whole life: wait for the request
//! head, read the (capped) body, run the handler, make sure a response went out, close.
//! One request is served per connection; the response always carries `Connection: close`.

mod config;
mod http_connection;

pub use config::ConnectionConfig;
pub use http_connection::HttpConnection;
