//! VitalTrack core library
//!
//! This module exports the core functionality of the VitalTrack vitals
//! tracking service.

pub mod api;
pub mod auth;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod trend;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    use crate::pipeline::Thresholds;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub auth: AuthConfig,
        #[serde(default)]
        pub clinical: Thresholds,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AuthConfig {
        pub jwt_secret: String,
        pub token_ttl_minutes: i64,
    }

    /// Load configuration from files, then environment overrides.
    pub fn load_config() -> Result<Config, config::ConfigError> {
        // Environment-specific settings override the defaults.
        let env = std::env::var("VITALTRACK_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("VITALTRACK").separator("__"))
            .build()?
            .try_deserialize()
    }
}
