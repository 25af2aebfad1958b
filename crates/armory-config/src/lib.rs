//! # armory-config
//!
//! Layered configuration loading for Armory using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ARMORY_*` prefix, `__` as separator)
//! 2. Project-level `.armory/config.toml`
//! 3. User-level `~/.config/armory/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `ARMORY_DATABASE__PATH` -> `database.path` and
//! `ARMORY_GENERAL__MAX_PAGE_SIZE` -> `general.max_page_size`.
//!
//! ```no_run
//! use armory_config::ArmoryConfig;
//!
//! let config = ArmoryConfig::load_with_dotenv().expect("config");
//! armory_config::init_tracing(&config.general).expect("tracing");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod general;
mod logging;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use logging::{LOG_ENV_VAR, init_tracing};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArmoryConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ArmoryConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed, or
    /// `ConfigError::InvalidValue` if the merged values are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after reading a `.env` file, if one exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate a configuration from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".armory/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("ARMORY_").split("__"))
    }

    /// Reject settings no listing could honour.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.general.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.max_page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.general.default_page_size == 0
            || self.general.default_page_size > self.general.max_page_size
        {
            return Err(ConfigError::InvalidValue {
                field: "general.default_page_size".into(),
                reason: format!(
                    "must be between 1 and max_page_size ({})",
                    self.general.max_page_size
                ),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("armory").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
