//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) + process environment
//!     → loader.rs (read variables, apply defaults)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a change requires a restart
//! - Optional fields have defaults to allow minimal environments
//! - Missing required variables are fatal before any socket is bound

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_dotenv, load_from_env, load_from_lookup, ConfigError};
pub use schema::{
    AuthConfig, BodyConfig, CorsConfig, DatabaseConfig, Environment, GatewayConfig,
    ListenerConfig, ObservabilityConfig, StaticFilesConfig,
};
pub use validation::ValidationError;
