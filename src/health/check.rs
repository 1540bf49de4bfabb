//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::ConnectionState;
use crate::http::server::AppState;

pub const HEALTHY_MSG: &str = "Servidor funcionando correctamente";

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    pub environment: String,
    pub database: ConnectionState,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        success: true,
        message: HEALTHY_MSG,
        timestamp: Utc::now().to_rfc3339(),
        environment: state.config.environment.to_string(),
        database: state.database.current_state(),
    })
}
