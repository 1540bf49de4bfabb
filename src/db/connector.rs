//! MongoDB connection owner.
//!
//! # Responsibilities
//! - Establish the single long-lived client, failing fast on timeout
//! - Publish connection state through a watch channel
//! - Record connection metadata for observability
//! - Close the client gracefully on shutdown

use std::sync::{Arc, OnceLock};

use mongodb::bson::doc;
use mongodb::options::{Acknowledgment, ClientOptions, ServerAddress, WriteConcern};
use mongodb::Client;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;

use crate::config::DatabaseConfig;
use crate::db::events;
use crate::db::state::{ConnectionInfo, ConnectionState};
use crate::observability::metrics;

/// Database used when the connection string names none.
pub const DEFAULT_DATABASE: &str = "test";

/// Port used when a host entry has none.
pub const DEFAULT_PORT: u16 = 27017;

/// Errors raised by the connector.
#[derive(Debug, Error)]
pub enum DbError {
    /// No connection string was configured.
    #[error("MONGO_URI is not defined in the environment")]
    MissingUri,

    /// The driver rejected the URI or the server could not be reached.
    #[error("database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// The initial connection did not complete in time.
    #[error("database connection not established within {0} ms")]
    ConnectTimeout(u64),

    /// The client is not connected.
    #[error("database is not connected")]
    NotConnected,

    /// Graceful close did not complete in time.
    #[error("database close did not complete within {0} seconds")]
    CloseTimeout(u64),
}

pub type DbResult<T> = Result<T, DbError>;

/// Owns the database client and its observable state.
pub struct DatabaseConnector {
    config: DatabaseConfig,
    development: bool,
    state: Arc<watch::Sender<ConnectionState>>,
    client: Mutex<Option<Client>>,
    info: OnceLock<ConnectionInfo>,
}

impl DatabaseConnector {
    /// Create a connector. No I/O happens until `connect`.
    pub fn new(config: DatabaseConfig, development: bool) -> Self {
        let (tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            development,
            state: Arc::new(tx),
            client: Mutex::new(None),
            info: OnceLock::new(),
        }
    }

    /// Current connection state.
    pub fn current_state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Metadata of the established connection, if any.
    pub fn info(&self) -> Option<&ConnectionInfo> {
        self.info.get()
    }

    /// Shared client handle for route handlers.
    pub async fn client(&self) -> DbResult<Client> {
        self.client.lock().await.clone().ok_or(DbError::NotConnected)
    }

    /// Establish the connection. There is no retry; the caller decides
    /// whether a failure is fatal.
    pub async fn connect(&self) -> DbResult<ConnectionInfo> {
        if self.config.uri.trim().is_empty() {
            self.set_state(ConnectionState::Error);
            return Err(DbError::MissingUri);
        }

        self.set_state(ConnectionState::Connecting);
        let limit = self.config.server_selection_timeout();

        let result = match timeout(limit, self.establish()).await {
            Ok(result) => result,
            Err(_) => Err(DbError::ConnectTimeout(self.config.server_selection_timeout_ms)),
        };

        match result {
            Ok((client, info)) => {
                *self.client.lock().await = Some(client);
                let _ = self.info.set(info.clone());
                self.set_state(ConnectionState::Connected);
                tracing::info!(
                    database = %info.database,
                    host = %info.host,
                    port = info.port,
                    "Database connected"
                );
                Ok(info)
            }
            Err(e) => {
                self.set_state(ConnectionState::Error);
                tracing::error!(error = %e, "Database connection failed");
                if self.development {
                    tracing::error!(details = ?e, "Database connection failure details");
                }
                Err(e)
            }
        }
    }

    async fn establish(&self) -> DbResult<(Client, ConnectionInfo)> {
        let mut options = ClientOptions::parse(&self.config.uri).await?;
        options.server_selection_timeout = Some(self.config.server_selection_timeout());
        options.retry_writes = Some(true);
        options.write_concern = Some(WriteConcern::builder().w(Acknowledgment::Majority).build());
        options.app_name = Some(self.config.app_name.clone());
        options.sdam_event_handler = Some(events::handler(Arc::clone(&self.state)));

        let info = connection_info(&options);
        let client = Client::with_options(options)?;

        // Forces server selection, so an unreachable server fails here.
        client
            .database(&info.database)
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok((client, info))
    }

    /// Close the client. Closing a connector that never connected is a no-op.
    pub async fn close(&self) -> DbResult<()> {
        let Some(client) = self.client.lock().await.take() else {
            tracing::debug!("Database close requested with no open client");
            self.set_state(ConnectionState::Disconnected);
            return Ok(());
        };

        timeout(self.config.close_timeout(), client.shutdown())
            .await
            .map_err(|_| DbError::CloseTimeout(self.config.close_timeout_secs))?;

        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Database connection closed on application shutdown");
        Ok(())
    }

    fn set_state(&self, next: ConnectionState) {
        if self.state.send_replace(next) != next {
            metrics::record_db_state(next);
        }
    }
}

/// Database name and first host of a parsed connection string.
pub fn connection_info(options: &ClientOptions) -> ConnectionInfo {
    let (host, port) = options
        .hosts
        .first()
        .map(|addr| match addr {
            ServerAddress::Tcp { host, port } => (host.clone(), port.unwrap_or(DEFAULT_PORT)),
            other => (other.to_string(), DEFAULT_PORT),
        })
        .unwrap_or_else(|| ("localhost".to_string(), DEFAULT_PORT));

    ConnectionInfo {
        database: options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        host,
        port,
    }
}
