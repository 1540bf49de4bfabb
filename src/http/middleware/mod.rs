//! Request pipeline stages implemented as axum middleware.

pub mod body;
pub mod cookies;
pub mod cors;
pub mod errors;
pub mod logging;

pub use body::{BodyLimit, ParsedBody};
pub use cookies::Cookies;
pub use cors::{CorsPolicy, OriginDecision};
pub use errors::ErrorPolicy;
