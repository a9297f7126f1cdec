//! Policy ledger API server binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin policy-ledger-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin policy-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - Warehouse connection string
//! * `API_METADATA_ROUTINE` - Metadata refresh routine name
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_STORE__*` - Policy store layout overrides (e.g. `API_STORE__DATASET_ID`)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use domain_policy::PolicyService;
use infra_warehouse::{create_pool, PgWarehouse, PoolSettings, SqlMetadataManager};
use interface_api::{config::ApiConfig, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    config
        .store
        .validate()
        .context("Invalid policy store configuration")?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting policy ledger API server"
    );

    let pool = create_pool(PoolSettings::new(&config.database_url))
        .await
        .context("Failed to create warehouse pool")?;
    verify_connectivity(&pool).await?;

    let warehouse = Arc::new(PgWarehouse::new(pool.clone()));
    let metadata = Arc::new(SqlMetadataManager::new(pool, &config.metadata_routine));
    let service = Arc::new(PolicyService::new(
        config.store.clone(),
        warehouse,
        metadata,
    ));

    let app = create_router(service);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("Invalid server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment, falling back to individual
/// variables and defaults.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| {
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL")
                .or_else(|_| std::env::var("API_DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            metadata_routine: std::env::var("API_METADATA_ROUTINE")
                .unwrap_or(defaults.metadata_routine),
            log_level: std::env::var("API_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            store: defaults.store,
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Verifies the warehouse answers before serving traffic. Schema management
/// is out of scope; relations are expected to exist already.
async fn verify_connectivity(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Warehouse connectivity check failed")?;
    tracing::info!("Warehouse ready");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
