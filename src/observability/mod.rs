//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, panic reports)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty in development, JSON lines elsewhere)
//!     → Metrics endpoint (Prometheus scrape, when METRICS_ADDR is set)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every request span
//! - Metrics are cheap (atomic increments) and off unless an exporter runs

pub mod logging;
pub mod metrics;
