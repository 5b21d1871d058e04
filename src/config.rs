//! TOML configuration for the data source, split parameters, and logging.
//!
//! Every key is optional; a missing file yields the defaults, which match the
//! conventional `data/raw/final.csv` layout.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::dataset::split::{DEFAULT_SEED, DEFAULT_TARGET_COLUMN, DEFAULT_TEST_FRACTION};
use crate::dataset::SplitOptions;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Dataset location relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/raw/final.csv";
/// Indicator column used to stratify the batch train/test split.
pub const DEFAULT_STRATIFY_COLUMN: &str = "property_type_Bunglow";

const DEFAULT_MAX_LOG_FILES: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("No suitable config directory found")]
    NoConfigDir,
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregate application settings.
///
/// Config keys (TOML): `[data]`, `[split]`, `[logging]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub split: SplitSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the dataset lives and which column is predicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    #[serde(default = "default_target_column")]
    pub target_column: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            target_column: default_target_column(),
        }
    }
}

/// Batch train/test split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    #[serde(default = "default_stratify_column")]
    pub stratify_column: String,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            stratify_column: default_stratify_column(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

impl SplitSettings {
    pub fn options(&self) -> SplitOptions {
        SplitOptions {
            test_fraction: self.test_fraction,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log directory; defaults to `logs/` under the app root.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            max_files: default_max_log_files(),
        }
    }
}

impl AppConfig {
    /// Replace out-of-range values with their defaults.
    pub fn normalized(mut self) -> Self {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            self.split.test_fraction = default_test_fraction();
        }
        self.logging.max_files = self.logging.max_files.max(1);
        self
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_target_column() -> String {
    DEFAULT_TARGET_COLUMN.to_string()
}

fn default_stratify_column() -> String {
    DEFAULT_STRATIFY_COLUMN.to_string()
}

fn default_test_fraction() -> f64 {
    DEFAULT_TEST_FRACTION
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_max_log_files() -> usize {
    DEFAULT_MAX_LOG_FILES
}

/// Resolve the configuration file path inside the app root.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dir = app_dirs::app_root_dir().map_err(map_app_dir_error)?;
    Ok(dir.join(CONFIG_FILE_NAME))
}

/// Load `config.toml` from the app root, returning defaults if it is missing.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_from(&path)
}

/// Load an explicit config file; absence is an error.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

fn parse(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    toml::from_str::<AppConfig>(text)
        .map(AppConfig::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => ConfigError::CreateDir { path, source },
    }
}
