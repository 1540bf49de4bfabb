//! Configuration loading from the process environment.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::{CorsConfig, Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    let mut out = String::from("Validation failed: ");
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&err.to_string());
    }
    out
}

impl ConfigError {
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ConfigError::Validation(errors) => errors,
        }
    }
}

/// Seed the environment from a `.env` file in the working directory, if any.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
}

/// Load and validate configuration from the process environment.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load and validate configuration from an arbitrary variable source.
pub fn load_from_lookup<F>(lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let mut config = GatewayConfig::default();
    let mut errors = Vec::new();

    if let Some(env) = var("NODE_ENV") {
        config.environment = Environment::new(env);
    }
    if let Some(uri) = var("MONGO_URI") {
        config.database.uri = uri;
    }
    if let Some(secret) = var("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }
    if let Some(host) = var("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = var("PORT") {
        match port.trim().parse::<u16>() {
            Ok(p) => config.listener.port = p,
            Err(e) => errors.push(ValidationError::Invalid {
                name: "PORT",
                reason: format!("'{}': {}", port, e),
            }),
        }
    }
    config.cors = CorsConfig::with_frontend(var("FRONTEND_URL").as_deref().map(str::trim));
    if let Some(dir) = var("PUBLIC_DIR") {
        config.static_files.root = PathBuf::from(dir);
    }
    config.observability.metrics_address = var("METRICS_ADDR");

    if let Err(mut semantic) = validate_config(&config) {
        errors.append(&mut semantic);
    }
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}
