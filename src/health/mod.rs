//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → check.rs (environment + database state snapshot)
//!     → 200 JSON report
//! ```
//!
//! # Design Decisions
//! - Always 200 while the process serves traffic; the database state is
//!   reported, not enforced, so a supervisor does not restart the gateway
//!   while the driver is still reconnecting

pub mod check;

pub use check::{health_check, HealthReport, HEALTHY_MSG};
