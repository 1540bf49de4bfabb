//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, graceful shutdown)
//!     → pipeline.rs (ordered middleware stages)
//!     → middleware/* (origin policy, body, cookies, logging, errors)
//!     → /health | mounted /api groups | static assets | 404
//!     → response.rs (JSON bodies shared by every exit path)
//! ```

pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{RequestExt, X_REQUEST_ID};
pub use server::{AppState, GatewayServer};
