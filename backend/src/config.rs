//! Configuration management for the Solar Performance Monitor
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SPM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::models::Installation;
use shared::performance::PerformanceSettings;
use shared::validation::{validate_email, validate_installation};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Metering API configuration
    pub metering: MeteringConfig,

    /// Weather archive API configuration
    pub weather: WeatherConfig,

    /// Underperformance detection parameters
    pub monitoring: PerformanceSettings,

    /// Alert email configuration
    pub email: EmailConfig,

    /// Monitored installations
    #[serde(default)]
    pub installations: Vec<Installation>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeteringConfig {
    /// Metering API base URL
    pub base_url: String,

    /// API key sent as X-API-KEY
    pub api_key: String,

    /// Energy identifier sent as X-ENERGY-ID
    pub energy_id: String,

    /// OBIS code of the production register to collect
    pub obis_code: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather archive API base URL
    pub base_url: String,

    /// Timezone the daily aggregates are computed in
    pub timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Mail relay endpoint
    pub relay_url: String,

    /// Bearer token for the mail relay
    pub api_token: String,

    /// Sender address shown on alert mails
    pub sender: String,

    /// Alert recipients
    pub recipients: Vec<String>,

    /// Require every recipient to accept before an alert counts as sent
    #[serde(default)]
    pub require_all_delivered: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("SPM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("metering.base_url", "https://api.leneda.lu")?
            .set_default("metering.obis_code", "1-65:2.29.9.0")?
            .set_default("weather.base_url", "https://archive-api.open-meteo.com/v1")?
            .set_default("weather.timezone", "Europe/Luxembourg")?
            .set_default(
                "monitoring.panel_efficiency",
                shared::performance::DEFAULT_PANEL_EFFICIENCY,
            )?
            .set_default(
                "monitoring.underperformance_threshold",
                shared::performance::DEFAULT_UNDERPERFORMANCE_THRESHOLD,
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SPM_ prefix)
            .add_source(
                Environment::with_prefix("SPM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the collector would fail on at run time
    fn validate(&self) -> Result<(), ConfigError> {
        self.monitoring
            .validate()
            .map_err(|e| ConfigError::Message(format!("monitoring: {}", e)))?;

        for installation in &self.installations {
            validate_installation(installation).map_err(|e| {
                ConfigError::Message(format!(
                    "installation {}: {}",
                    installation.pod_code, e
                ))
            })?;
        }

        for recipient in &self.email.recipients {
            validate_email(recipient).map_err(|e| {
                ConfigError::Message(format!("email recipient {}: {}", recipient, e))
            })?;
        }

        Ok(())
    }

    /// Look up a configured installation by its POD code
    pub fn installation(&self, pod_code: &str) -> Option<&Installation> {
        self.installations
            .iter()
            .find(|i| i.pod_code == pod_code)
    }
}
