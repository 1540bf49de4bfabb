//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gym_gateway::config::{DatabaseConfig, GatewayConfig};
use gym_gateway::{ApiRoutes, DatabaseConnector, GatewayServer, Shutdown};
use tokio::net::TcpListener;

/// Config for a local gateway whose database is never reached.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.database = DatabaseConfig {
        uri: "mongodb://127.0.0.1:9/gym".into(),
        server_selection_timeout_ms: 300,
        ..DatabaseConfig::default()
    };
    config.auth.jwt_secret = "test-secret".into();
    config
}

/// A gateway serving on an ephemeral port until `shutdown` is triggered.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Bind an ephemeral port and serve the gateway without connecting to the
/// database.
pub async fn start_gateway(config: GatewayConfig, routes: ApiRoutes) -> RunningGateway {
    let database = Arc::new(DatabaseConnector::new(
        config.database.clone(),
        config.is_development(),
    ));
    let server = GatewayServer::new(Arc::new(config), database, routes);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningGateway { addr, shutdown }
}

/// Client without pooling or proxies so tests do not interfere.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
