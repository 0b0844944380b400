use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use thiserror::Error;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONFIG_DIR: &str = "config";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration loading error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Backend API settings consumed by [`crate::client::HttpEntryApi`].
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ApiConfig {
    /// Base URL of the backend REST API.
    #[validate(url(message = "api.base_url must be a valid URL"))]
    pub base_url: String,

    /// Per-request timeout in seconds (the only client-side timeout; no
    /// retry or backoff exists anywhere in the workflow).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[validate]
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Loads and validates the application configuration.
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (GARMENT_*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    let config = Config::builder()
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("environment", run_env.clone())?
        .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("GARMENT").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
