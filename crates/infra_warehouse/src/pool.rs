//! Connection pool management
//!
//! Pool configuration and creation for the Postgres-backed warehouse client.
//! One pool is constructed at process start and handed to the adapters; the
//! service never owns a connection itself.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use domain_policy::WarehouseError;

/// Type alias for the warehouse connection pool
pub type WarehousePool = PgPool;

/// Configuration options for the connection pool
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infra_warehouse::PoolSettings;
///
/// let settings = PoolSettings::new("postgres://localhost/warehouse")
///     .max_connections(20)
///     .min_connections(5)
///     .connect_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
    /// Idle timeout before closing a connection
    pub idle_timeout: Duration,
}

impl PoolSettings {
    /// Creates pool settings with sensible defaults for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
        }
    }

    /// Sets the maximum number of connections in the pool
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections to maintain
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout duration
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the maximum lifetime of a connection
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Sets the idle timeout before closing a connection
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

/// Creates a warehouse connection pool with the given settings.
///
/// # Errors
///
/// Returns [`WarehouseError::ConnectionFailed`] if the pool cannot be created.
pub async fn create_pool(settings: PoolSettings) -> Result<WarehousePool, WarehouseError> {
    info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "Creating warehouse pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.connect_timeout)
        .max_lifetime(settings.max_lifetime)
        .idle_timeout(settings.idle_timeout)
        .connect(&settings.url)
        .await
        .map_err(|e| WarehouseError::ConnectionFailed(e.to_string()))?;

    info!("Warehouse pool created");
    Ok(pool)
}
