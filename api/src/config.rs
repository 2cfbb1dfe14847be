use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::entities::SkuScope;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Allowed CORS origin, `:*` matching any port; any origin when unset
    pub cors_allowed_origin: Option<String>,
    pub sku_scope: SkuScope,
    /// Create missing tables and indexes on start
    pub auto_migrate: bool,
    /// Load sample data when the store has no warehouses
    pub seed_sample_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            port: parse_or(&lookup, "PORT", 8080)?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN").filter(|o| !o.trim().is_empty()),
            sku_scope: parse_or(&lookup, "SKU_SCOPE", SkuScope::Global)?,
            auto_migrate: parse_or(&lookup, "AUTO_MIGRATE", true)?,
            seed_sample_data: parse_or(&lookup, "SEED_SAMPLE_DATA", false)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
