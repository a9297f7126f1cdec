//! API configuration

use domain_policy::StoreConfig;
use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Warehouse connection string
    pub database_url: String,
    /// Name of the metadata refresh routine
    pub metadata_routine: String,
    /// Log level
    pub log_level: String,
    /// Policy store layout
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/warehouse".to_string(),
            metadata_routine: "refresh_policy_metadata".to_string(),
            log_level: "info".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment (prefix `API`, `__` separates
    /// nested store fields, e.g. `API_STORE__DATASET_ID`)
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_layout_is_valid() {
        let config = ApiConfig::default();
        assert!(config.store.validate().is_ok());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }
}
