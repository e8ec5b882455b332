use std::time::Duration;

use serde::Deserialize;

use crate::codec::{DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_HEADER_BYTES};
use crate::protocol::DEFAULT_WRITE_CHUNK_SIZE;

/// Limits and timeouts applied to every connection.
///
/// Every field has a default, so a partial config deserializes fine:
///
/// ```
/// use express_http::connection::ConnectionConfig;
///
/// let config: ConnectionConfig = serde_json::from_str(r#"{ "max_body_size": 1024 }"#).unwrap();
/// assert_eq!(config.max_body_size, 1024);
/// assert_eq!(config.connect_timeout_ms, 3000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// How long to wait for a complete request head.
    pub connect_timeout_ms: u64,
    /// How long to wait for the whole body once the head was parsed.
    pub body_timeout_ms: u64,
    /// Bodies longer than this are truncated.
    pub max_body_size: usize,
    pub max_header_bytes: usize,
    /// Slice size for binary responses.
    pub write_chunk_size: usize,
    /// Dispatch requests with an unrecognized method as `GET` instead of answering 400.
    pub unknown_method_as_get: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 3000,
            body_timeout_ms: 5000,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            write_chunk_size: DEFAULT_WRITE_CHUNK_SIZE,
            unknown_method_as_get: false,
        }
    }
}

impl ConnectionConfig {
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[inline]
    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }
}
