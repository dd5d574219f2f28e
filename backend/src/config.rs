//! Configuration management for the Item Weight Measure form host
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with IWM_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{GenerationPolicy, ShapeSetting};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// ERP connection used for `generate_item_best_month`
    pub erp: ErpConfig,

    /// Form behaviour
    #[serde(default)]
    pub form: FormConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ErpConfig {
    /// Base URL of the ERP site, e.g. https://erp.example.com
    pub base_url: String,

    /// Dotted path of the whitelisted report method
    pub method: String,

    /// API key of the integration user
    #[serde(default)]
    pub api_key: Option<String>,

    /// API secret of the integration user
    #[serde(default)]
    pub api_secret: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Which response shape to expect (auto, modern, legacy)
    #[serde(default)]
    pub response_shape: ShapeSetting,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormConfig {
    /// What a generate does while another one is pending (reject, supersede)
    #[serde(default)]
    pub generation_policy: GenerationPolicy,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("IWM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("erp.base_url", "http://localhost:8000")?
            .set_default(
                "erp.method",
                "data_analytics.data_analytics.doctype.item_weight_measure.item_weight_measure.generate_item_best_month",
            )?
            .set_default("erp.timeout_secs", 60)?
            .set_default("erp.response_shape", "auto")?
            .set_default("form.generation_policy", "reject")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (IWM_ prefix)
            .add_source(
                Environment::with_prefix("IWM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl ErpConfig {
    /// Key and secret, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Some((key, secret)),
            _ => None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
