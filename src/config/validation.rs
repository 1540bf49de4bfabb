//! Configuration validation.
//!
//! # Responsibilities
//! - Check that required secrets and connection strings are present
//! - Validate value shapes (URI schemes, origin URLs, socket addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required environment variable is unset or blank.
    #[error("{0} is not defined in the environment")]
    Missing(&'static str),

    /// A variable is set but its value has the wrong shape.
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Validate a fully-populated configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let uri = config.database.uri.trim();
    if uri.is_empty() {
        errors.push(ValidationError::Missing("MONGO_URI"));
    } else if !(uri.starts_with("mongodb://") || uri.starts_with("mongodb+srv://")) {
        errors.push(ValidationError::Invalid {
            name: "MONGO_URI",
            reason: "expected a mongodb:// or mongodb+srv:// connection string".into(),
        });
    }

    if config.auth.jwt_secret.trim().is_empty() {
        errors.push(ValidationError::Missing("JWT_SECRET"));
    }

    for origin in &config.cors.allowed_origins {
        if let Err(reason) = check_origin(origin) {
            errors.push(ValidationError::Invalid {
                name: "FRONTEND_URL",
                reason,
            });
        }
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::Invalid {
                name: "METRICS_ADDR",
                reason: format!("'{}' is not a socket address", addr),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_origin(origin: &str) -> Result<(), String> {
    let url = Url::parse(origin).map_err(|e| format!("'{}': {}", origin, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("'{}' must use http or https", origin));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", origin));
    }
    Ok(())
}
