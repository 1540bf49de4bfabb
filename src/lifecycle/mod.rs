//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config (already validated) → metrics → DB connect (background)
//!     → HTTP server → bind → race {server, DB failure, signal}
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → close DB → exit
//!
//! Signals (signals.rs):
//!     SIGINT / SIGTERM → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Exit status is 0 only after a signal and a clean database close
//! - A database that cannot be reached at startup ends the process, leaving
//!   restarts to the process supervisor

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, ShutdownSignal};
pub use startup::{ExitStatus, StartupError};
