//! Gym API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ RequestId → Trace → ErrorTranslation → PanicCapture
//!                      → OriginPolicy → CorsHeaders → BodyParsing
//!                      → CookieParsing → RequestLogging
//!                              │
//!                              ▼
//!           /health │ /api/{auth,users,instructores,classes,youtube}
//!                   │ static assets │ 404
//!
//!     Cross-cutting: config (.env + environment), db (MongoDB connector),
//!     observability (tracing, metrics), lifecycle (startup, signals)
//! ```

use std::process::ExitCode;

use gym_gateway::config::{self, Environment};
use gym_gateway::lifecycle::startup::{self, ExitStatus, StartupError};
use gym_gateway::observability::logging;
use gym_gateway::routing::ApiRoutes;

#[tokio::main]
async fn main() -> ExitCode {
    config::load_dotenv();

    let environment = std::env::var("NODE_ENV")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(Environment::new)
        .unwrap_or_default();
    logging::init(&environment);
    logging::install_panic_hook();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gym-gateway starting");

    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            for err in e.errors() {
                tracing::error!(error = %err, "FATAL ERROR: invalid configuration");
            }
            return ExitStatus::Failure.into();
        }
    };

    let result = match tokio::spawn(startup::run(config, ApiRoutes::new())).await {
        Ok(result) => result,
        Err(e) => Err(StartupError::from_join(e)),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Gateway terminated");
    }
    ExitStatus::from(&result).into()
}
