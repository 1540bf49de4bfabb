//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! Every field is filled from the process environment by `loader.rs`; the
//! defaults below apply when an optional variable is unset.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Origins always allowed to issue cross-origin requests.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "https://gymn.web.app",
    "https://gymn.firebaseapp.com",
    "http://localhost:4200",
    "http://localhost:3000",
];

/// Cap applied to JSON and URL-encoded request bodies (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Serialize, Default)]
pub struct GatewayConfig {
    /// Runtime environment name (`NODE_ENV`).
    pub environment: Environment,

    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Document database connection settings.
    pub database: DatabaseConfig,

    /// Token signing settings handed to the auth routes.
    pub auth: AuthConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Request body parsing limits.
    pub body: BodyConfig,

    /// Public directory served for unmatched paths.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GatewayConfig {
    /// True when detailed error diagnostics may be sent to clients.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Runtime environment, as named by `NODE_ENV`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    pub const DEVELOPMENT: &'static str = "development";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn production() -> Self {
        Self::new("production")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Development mode is an exact, case-sensitive match.
    pub fn is_development(&self) -> bool {
        self.0 == Self::DEVELOPMENT
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(Self::DEVELOPMENT)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Database connection configuration.
#[derive(Clone, Serialize)]
pub struct DatabaseConfig {
    /// Connection string (`MONGO_URI`). Empty means unset.
    #[serde(skip)]
    pub uri: String,

    /// Upper bound for the initial connection attempt, in milliseconds.
    pub server_selection_timeout_ms: u64,

    /// Upper bound for the graceful close on shutdown, in seconds.
    pub close_timeout_secs: u64,

    /// Name reported to the server in the handshake.
    pub app_name: String,
}

impl DatabaseConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            server_selection_timeout_ms: 5000,
            close_timeout_secs: 10,
            app_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

// The URI usually carries credentials.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("uri", &if self.uri.is_empty() { "<unset>" } else { "<redacted>" })
            .field("server_selection_timeout_ms", &self.server_selection_timeout_ms)
            .field("close_timeout_secs", &self.close_timeout_secs)
            .field("app_name", &self.app_name)
            .finish()
    }
}

/// Token signing configuration.
#[derive(Clone, Serialize, Default)]
pub struct AuthConfig {
    /// Secret used to sign session tokens (`JWT_SECRET`). Empty means unset.
    #[serde(skip)]
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CorsConfig {
    /// Exact-match origin allow list, in insertion order.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Built-in origins plus an optional frontend URL, without duplicates.
    pub fn with_frontend(frontend_url: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = frontend_url {
            if !config.allowed_origins.iter().any(|o| o == url) {
                config.allowed_origins.push(url.to_string());
            }
        }
        config
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// Request body configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BodyConfig {
    /// Maximum size of a JSON or URL-encoded body, in bytes.
    pub limit_bytes: usize,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Serialize)]
pub struct StaticFilesConfig {
    /// Directory whose files are served as-is.
    pub root: PathBuf,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address; `None` disables the exporter.
    pub metrics_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:5000");
        assert!(config.is_development());
        assert_eq!(config.body.limit_bytes, 10 * 1024 * 1024);
        assert_eq!(config.database.server_selection_timeout(), Duration::from_millis(5000));
        assert_eq!(config.cors.allowed_origins.len(), 4);
    }

    #[test]
    fn frontend_url_is_appended_once() {
        let cors = CorsConfig::with_frontend(Some("https://app.gym.example"));
        assert_eq!(cors.allowed_origins.last().map(String::as_str), Some("https://app.gym.example"));
        assert_eq!(cors.allowed_origins.len(), 5);

        let cors = CorsConfig::with_frontend(Some("http://localhost:3000"));
        assert_eq!(cors.allowed_origins.len(), 4);
    }

    #[test]
    fn origin_matching_is_exact() {
        let cors = CorsConfig::default();
        assert!(cors.is_allowed("http://localhost:3000"));
        assert!(!cors.is_allowed("http://localhost:3000/"));
        assert!(!cors.is_allowed("HTTP://LOCALHOST:3000"));
        assert!(!cors.is_allowed("http://evil.example"));
    }

    #[test]
    fn environment_mode() {
        assert!(Environment::default().is_development());
        assert!(!Environment::production().is_development());
        assert!(!Environment::new("Development").is_development());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let mut config = GatewayConfig::default();
        config.database.uri = "mongodb://user:hunter2@db:27017/gym".into();
        config.auth.jwt_secret = "s3cr3t".into();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cr3t"));
    }
}
