//! Database connector subsystem.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig (MONGO_URI, timeouts)
//!     → connector.rs (parse URI, build client, ping)
//!     → state.rs (ConnectionState published via watch channel)
//!     → events.rs (driver SDAM events → state + log lines)
//!
//! Consumers:
//!     → health endpoint (current state)
//!     → route handlers (shared client handle)
//!     → lifecycle (fatal connect failure, close on shutdown)
//! ```
//!
//! # Design Decisions
//! - One client per process, owned by the connector and injected via AppState
//! - Fail fast: no retry on the initial connect
//! - Observers log only; the driver handles reconnection internally

pub mod connector;
pub mod events;
pub mod state;

pub use connector::{DatabaseConnector, DbError, DbResult};
pub use state::{ConnectionInfo, ConnectionState};
