use crate::models::EditPolicy;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub catalog: CatalogConfig,
    pub session: SessionConfig,
    /// Two-digit GST state code of the seller; drives the inter-state
    /// decision when a party is picked.
    pub seller_state_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Empty disables catalog lookups.
    pub base_url: String,
    pub product_search_path: String,
    pub party_search_path: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub default_edit_policy: EditPolicy,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            product_search_path: "/inventory/api/search".to_string(),
            party_search_path: "/ledgers/api/search".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_edit_policy: EditPolicy::Reject,
            idle_timeout: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl EditorConfig {
    pub fn from_env() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;

        Ok(EditorConfig {
            common,
            service_name: get_env("SERVICE_NAME", "invoice-editor"),
            log_level: get_env("LOG_LEVEL", "info"),
            otlp_endpoint: get_optional_env("OTLP_ENDPOINT"),
            catalog: CatalogConfig {
                base_url: get_env("CATALOG_BASE_URL", ""),
                product_search_path: get_env("PRODUCT_SEARCH_PATH", "/inventory/api/search"),
                party_search_path: get_env("PARTY_SEARCH_PATH", "/ledgers/api/search"),
                timeout: Duration::from_secs(parse_env("CATALOG_TIMEOUT_SECS", 10)?),
            },
            session: SessionConfig {
                default_edit_policy: parse_env("DEFAULT_EDIT_POLICY", EditPolicy::Reject)?,
                idle_timeout: Duration::from_secs(parse_env("SESSION_IDLE_TIMEOUT_SECS", 3600)?),
                sweep_interval: Duration::from_secs(parse_env(
                    "SESSION_SWEEP_INTERVAL_SECS",
                    60,
                )?),
            },
            seller_state_code: get_optional_env("SELLER_STATE_CODE"),
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("Invalid value for {}: {} ({})", key, raw, e))
    })
}
