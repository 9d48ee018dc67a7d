//! Configuration file support for overdash
//!
//! Reads from `overdash.toml`, found via `--config`, `$OVERDASH_CONFIG`,
//! or by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "OVERDASH_CONFIG";

/// File name searched for when no explicit config is given
pub const CONFIG_FILE_NAME: &str = "overdash.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Input file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Column names in the pivoted overdose table
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Dashboard defaults
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Directory relative data paths resolve against (the config file's directory)
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

/// Where the datasets and the pre-rendered chart live
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DataConfig {
    /// Drug description spreadsheet (.xlsx/.xls/.ods) or CSV
    #[serde(default = "default_descriptions")]
    pub descriptions: PathBuf,

    /// Worksheet holding the descriptions. Unset or empty: first sheet
    #[serde(default)]
    pub descriptions_sheet: Option<String>,

    /// Pivoted per-victim CSV
    #[serde(default = "default_overdoses")]
    pub overdoses: PathBuf,

    /// Pre-rendered chart document embedded under "The Killers".
    /// Set to an empty string to leave the section empty.
    #[serde(default = "default_combination_chart")]
    pub combination_chart: Option<PathBuf>,
}

fn default_descriptions() -> PathBuf {
    PathBuf::from("data/lab4_drug-description.xlsx")
}

fn default_overdoses() -> PathBuf {
    PathBuf::from("data/2012-2018_lab4_data_drug-overdose-deaths-connecticut-wrangled-pivot.csv")
}

fn default_combination_chart() -> Option<PathBuf> {
    Some(PathBuf::from("code/532_graph_overdose-count-by-2-drugs.html"))
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            descriptions: default_descriptions(),
            descriptions_sheet: None,
            overdoses: default_overdoses(),
            combination_chart: default_combination_chart(),
        }
    }
}

/// Demographic column names in the pivoted table.
/// Every other boolean-valued column is treated as a drug.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    #[serde(default = "default_age")]
    pub age: String,
    #[serde(default = "default_sex")]
    pub sex: String,
    #[serde(default = "default_race")]
    pub race: String,
    #[serde(default = "default_place")]
    pub place: String,
}

fn default_age() -> String {
    "Age".to_string()
}

fn default_sex() -> String {
    "Sex".to_string()
}

fn default_race() -> String {
    "Race".to_string()
}

fn default_place() -> String {
    "Location".to_string()
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            age: default_age(),
            sex: default_sex(),
            race: default_race(),
            place: default_place(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardConfig {
    /// Category selected when the page first loads
    #[serde(default = "default_drug")]
    pub default_drug: String,
}

fn default_drug() -> String {
    "Heroin".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_drug: default_drug(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl Config {
    /// Load config from an explicit path, `$OVERDASH_CONFIG`, or the nearest
    /// `overdash.toml`. Returns the default config if none is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::find_config_path);

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.root = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Find overdash.toml by walking up directory tree
    fn find_config_path() -> Option<PathBuf> {
        let current_dir = std::env::current_dir().ok()?;
        let mut dir = current_dir.as_path();

        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => break,
            }
        }
        None
    }

    /// Resolve a data path against the config file's directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Worksheet to read descriptions from; `None` means the first sheet
    pub fn descriptions_sheet(&self) -> Option<&str> {
        self.data
            .descriptions_sheet
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The combination chart path, if one is configured
    pub fn combination_chart_path(&self) -> Option<PathBuf> {
        self.data
            .combination_chart
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| self.resolve(p))
    }
}
