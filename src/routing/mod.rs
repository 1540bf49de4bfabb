//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route-group handlers (auth, users, instructors, classes, youtube)
//!     → router.rs (ApiRoutes: mount each router under its prefix)
//!     → http/server.rs (nested into the gateway router)
//!
//! Incoming path
//!     → matcher.rs (segment-aware prefix test)
//!     → RouteGroup or no match (→ static assets → 404)
//! ```
//!
//! # Design Decisions
//! - Prefixes are fixed at compile time
//! - Deterministic: same path always resolves to the same group

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, PathPrefixMatcher};
pub use router::{ApiRoutes, RouteGroup};
