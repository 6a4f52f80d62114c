//! Application configuration loading from pennywise.toml
//!
//! The `[defaults]` table holds the runtime settings the core needs (default category
//! name and description, reset token lifetime). Optional `[[users]]` entries describe
//! accounts, categories and monthly limits to seed on startup.

use crate::errors::{Error, Result};
use chrono::TimeDelta;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "PENNYWISE_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "pennywise.toml";

/// Longest accepted reset token lifetime (30 days)
pub const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 30;

/// Runtime settings shared by the core operations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the per-user fallback category
    pub category_name: String,
    /// Description given to the fallback category at signup
    pub category_description: String,
    /// How long a password reset token stays valid
    pub reset_token_ttl_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            category_name: "Uncategorized".to_string(),
            category_description: "Default category for uncategorized transactions".to_string(),
            reset_token_ttl_minutes: 60,
        }
    }
}

impl Settings {
    /// Reset token lifetime as a duration.
    pub fn reset_token_ttl(&self) -> Result<TimeDelta> {
        TimeDelta::try_minutes(self.reset_token_ttl_minutes)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| Error::Config {
                message: format!(
                    "reset token lifetime of {} minutes is out of range",
                    self.reset_token_ttl_minutes
                ),
            })
    }
}

/// Configuration structure representing the entire pennywise.toml file
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: Settings,
    /// Accounts to create on startup if they do not exist yet
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// A user to register on startup
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    /// Already-hashed password
    pub password_hash: String,
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
}

/// A category plus the limit of its budget for the current month
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub amount_limit: f64,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let mut config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse pennywise.toml: {e}"),
    })?;

    // Must match the trimmed name stored by insert_category
    config.defaults.category_name = config.defaults.category_name.trim().to_string();
    config.defaults.category_description = config.defaults.category_description.trim().to_string();

    if config.defaults.category_name.is_empty() {
        return Err(Error::Config {
            message: "defaults.category_name cannot be empty".to_string(),
        });
    }
    let ttl = config.defaults.reset_token_ttl_minutes;
    if !(1..=MAX_RESET_TOKEN_TTL_MINUTES).contains(&ttl) {
        return Err(Error::Config {
            message: format!(
                "defaults.reset_token_ttl_minutes must be between 1 and {MAX_RESET_TOKEN_TTL_MINUTES}"
            ),
        });
    }

    Ok(config)
}

/// Loads configuration from `$PENNYWISE_CONFIG` or `./pennywise.toml`.
///
/// A missing file is not an error: built-in defaults are used and nothing is seeded.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        info!("No config file at {}, using built-in defaults.", path);
        return Ok(AppConfig::default());
    }

    load_config(&path)
}
