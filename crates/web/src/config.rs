use express_http::connection::ConnectionConfig;
use serde::Deserialize;

/// Server settings, loadable from JSON.
///
/// ```
/// use express_web::ServerConfig;
///
/// let config: ServerConfig = serde_json::from_str(r#"{
///     "address": "127.0.0.1:8080",
///     "connection": { "body_timeout_ms": 1000 }
/// }"#).unwrap();
///
/// assert_eq!(config.address, "127.0.0.1:8080");
/// assert_eq!(config.connection.body_timeout_ms, 1000);
/// assert_eq!(config.connection.max_body_size, 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub connection: ConnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: "0.0.0.0:80".to_owned(), connection: ConnectionConfig::default() }
    }
}
