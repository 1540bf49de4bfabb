//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order: metrics, database
//!   connector, HTTP server, listener
//! - Start the database connection without holding up the listener
//! - Race the server, the database connection and the shutdown signal, and
//!   map the winner to an exit status
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is told to stop on shutdown, but in-flight requests are
//!   not drained; closing the database is the only awaited step

use std::future::Future;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::config::GatewayConfig;
use crate::db::{DatabaseConnector, DbError};
use crate::http::GatewayServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::{self, ShutdownSignal};
use crate::observability::{logging, metrics};
use crate::routing::{ApiRoutes, RouteGroup};

/// Fatal errors that end the process with a failure status.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("database connection failed: {0}")]
    Database(#[from] DbError),

    #[error("HTTP server failed: {0}")]
    Server(#[source] std::io::Error),

    #[error("HTTP server stopped unexpectedly")]
    ServerStopped,

    #[error("error closing database connection: {0}")]
    Close(#[source] DbError),

    #[error("task panicked: {0}")]
    Panicked(String),
}

impl StartupError {
    /// Map a failed background task to a fatal error.
    pub fn from_join(err: JoinError) -> Self {
        if err.is_panic() {
            StartupError::Panicked(logging::panic_message(err.into_panic().as_ref()))
        } else {
            StartupError::Panicked(err.to_string())
        }
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Clean,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::Failure => 1,
        }
    }
}

impl<T> From<&Result<T, StartupError>> for ExitStatus {
    fn from(result: &Result<T, StartupError>) -> Self {
        match result {
            Ok(_) => ExitStatus::Clean,
            Err(_) => ExitStatus::Failure,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Bind the configured address and serve until a signal or a fatal error.
pub async fn run(config: GatewayConfig, routes: ApiRoutes) -> Result<(), StartupError> {
    let config = Arc::new(config);

    if let Some(addr) = config.observability.metrics_address.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::warn!(address = %addr, error = %e, "Metrics exporter disabled"),
        }
    }

    let database = Arc::new(DatabaseConnector::new(
        config.database.clone(),
        config.is_development(),
    ));

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    serve(config, database, routes, listener, signals::shutdown_signal()).await
}

/// Serve on an already bound listener until `stop` resolves or a fatal
/// error occurs.
pub async fn serve<F>(
    config: Arc<GatewayConfig>,
    database: Arc<DatabaseConnector>,
    routes: ApiRoutes,
    listener: TcpListener,
    stop: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ShutdownSignal>,
{
    let mounted: Vec<&str> = routes.groups().iter().map(RouteGroup::prefix).collect();
    let server = GatewayServer::new(Arc::clone(&config), Arc::clone(&database), routes);
    let shutdown = Shutdown::new();

    let port = listener
        .local_addr()
        .map(|a| a.port())
        .unwrap_or(config.listener.port);
    tracing::info!(
        port,
        environment = %config.environment,
        url = %format!("http://localhost:{}", port),
        allowed_origins = %config.cors.allowed_origins.join(", "),
        mounted_groups = ?mounted,
        "Server running"
    );

    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));
    let connector = Arc::clone(&database);
    let mut connect_task = tokio::spawn(async move { connector.connect().await });
    let mut connecting = true;

    tokio::pin!(stop);

    let outcome = loop {
        tokio::select! {
            joined = &mut connect_task, if connecting => {
                connecting = false;
                match joined {
                    Ok(Ok(_)) => continue,
                    Ok(Err(e)) => break Err(StartupError::Database(e)),
                    Err(e) => break Err(StartupError::from_join(e)),
                }
            }
            joined = &mut server_task => {
                break match joined {
                    Ok(Ok(())) => Err(StartupError::ServerStopped),
                    Ok(Err(e)) => Err(StartupError::Server(e)),
                    Err(e) => Err(StartupError::from_join(e)),
                };
            }
            signal = &mut stop => {
                tracing::info!(signal = %signal, "Shutdown signal received");
                break Ok(());
            }
        }
    };

    if connecting {
        connect_task.abort();
    }
    shutdown.trigger();

    match outcome {
        Ok(()) => {
            database.close().await.map_err(StartupError::Close)?;
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
