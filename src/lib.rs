//! Gym API gateway library.
//!
//! HTTP front door for the gym application: validates the environment,
//! owns the MongoDB connection, runs every request through an ordered
//! pipeline (origin policy, body and cookie parsing, logging, error
//! translation) and mounts the API route groups, the health check, static
//! assets and the 404 fallback.

pub mod config;
pub mod db;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use db::DatabaseConnector;
pub use http::{ApiError, AppState, GatewayServer};
pub use lifecycle::Shutdown;
pub use routing::{ApiRoutes, RouteGroup};
