//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router: health check, mounted route groups, static
//!   assets and the 404 fallback
//! - Wrap it in the ordered request pipeline
//! - Bind server to listener and stop on the shutdown broadcast

use std::net::SocketAddr;
use std::sync::Arc;

use axum::handler::HandlerWithoutStateExt;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;

use crate::config::GatewayConfig;
use crate::db::DatabaseConnector;
use crate::health::health_check;
use crate::http::pipeline::{self, PipelineContext, LAYER_STAGES};
use crate::http::response;
use crate::routing::ApiRoutes;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub database: Arc<DatabaseConnector>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl GatewayServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: Arc<GatewayConfig>,
        database: Arc<DatabaseConnector>,
        routes: ApiRoutes,
    ) -> Self {
        let state = AppState {
            config: Arc::clone(&config),
            database,
        };
        let router = Self::build_router(&config, state, routes);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, routes: ApiRoutes) -> Router {
        let static_files = ServeDir::new(&config.static_files.root)
            .call_fallback_on_method_not_allowed(true)
            .fallback(response::not_found.into_service());

        let app = Router::new()
            .route("/health", get(health_check))
            .merge(routes.into_router())
            .fallback_service(static_files)
            .method_not_allowed_fallback(response::not_found)
            .with_state(state);

        pipeline::assemble(app, &LAYER_STAGES, &PipelineContext::from_config(config))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            allowed_origins = ?self.config.cors.allowed_origins,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
