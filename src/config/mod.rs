use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::DEFAULT_CURRENCY;

const DEFAULT_DIR_NAME: &str = ".balance_core";
const HOME_ENV: &str = "BALANCE_CORE_HOME";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR: &str = "files";
const DATA_FILE: &str = "balances.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persisted user preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Ledger file; falls back to `<app dir>/files/balances.csv`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    pub currency: String,
    /// Suppress decorative separators in CLI output.
    pub quiet: bool,
    /// Ask before replacing the ledger file on exit.
    pub confirm_overwrite: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            currency: DEFAULT_CURRENCY.into(),
            quiet: false,
            confirm_overwrite: true,
        }
    }
}

/// Loads and stores [`Config`] under the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
}

impl ConfigManager {
    /// Uses `$BALANCE_CORE_HOME`, or `~/.balance_core` when unset.
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = self.config_path();
        if path.exists() {
            let data = fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.base)?;
        let json = serde_json::to_string_pretty(config)?;
        let path = self.config_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Ledger file the configuration points at.
    pub fn data_file(&self, config: &Config) -> PathBuf {
        config
            .data_file
            .clone()
            .unwrap_or_else(|| self.base.join(DATA_DIR).join(DATA_FILE))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the application-specific data directory.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
