use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// Connect timeout for the NATS client in seconds
    #[serde(default = "default_nats_connect_timeout_secs")]
    pub nats_connect_timeout_secs: u64,

    // Secondary store configuration
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    #[serde(default)]
    pub postgres_password: String,

    #[serde(default = "default_postgres_pool_size")]
    pub postgres_pool_size: usize,

    /// Base URL of the forecast service
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,

    /// Tenant the refresh loop reports on
    #[serde(default = "default_tenant_id")]
    pub tenant_id: i64,

    /// Bearer token forwarded to the domain services
    #[serde(default)]
    pub authorization_token: String,

    /// Forecast entity code of the tenant, if it has a forecast profile
    #[serde(default)]
    pub entity_code: Option<String>,

    /// Seconds between report refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_connect_timeout_secs() -> u64 {
    5
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "perisai".to_string()
}

fn default_postgres_username() -> String {
    "perisai".to_string()
}

fn default_postgres_pool_size() -> usize {
    8
}

fn default_forecast_base_url() -> String {
    "http://localhost:8600".to_string()
}

fn default_tenant_id() -> i64 {
    1
}

fn default_refresh_interval_secs() -> u64 {
    300
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("PERISAI"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize tests that mutate process environment variables.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("PERISAI_NATS_URL");
        std::env::remove_var("PERISAI_TENANT_ID");
        std::env::remove_var("PERISAI_REFRESH_INTERVAL_SECS");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.tenant_id, 1);
        assert_eq!(config.refresh_interval_secs, 300);
        assert_eq!(config.entity_code, None);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("PERISAI_NATS_URL", "nats://broker:4222");
        std::env::set_var("PERISAI_TENANT_ID", "42");
        std::env::set_var("PERISAI_REFRESH_INTERVAL_SECS", "60");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.nats_url, "nats://broker:4222");
        assert_eq!(config.tenant_id, 42);
        assert_eq!(config.refresh_interval_secs, 60);

        std::env::remove_var("PERISAI_NATS_URL");
        std::env::remove_var("PERISAI_TENANT_ID");
        std::env::remove_var("PERISAI_REFRESH_INTERVAL_SECS");
    }
}
