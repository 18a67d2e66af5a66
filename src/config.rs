/*!
 * Configuration support for the doctor finder
 *
 * Provides runtime configuration for where the panel lives and how it is
 * loaded and displayed.
 */

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::OutputFormat;

/// Global configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Panel file used when no path is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,

    /// Whether to show a spinner while loading the panel
    #[serde(default = "default_enable_progress_bar")]
    pub enable_progress_bar: bool,

    /// Whether to skip rows that cannot be parsed
    #[serde(default)]
    pub skip_invalid_records: bool,

    /// Output format for search results
    #[serde(default)]
    pub default_output_format: OutputFormat,

    /// Rows shown per region in table output (None = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows_per_group: Option<usize>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            enable_progress_bar: default_enable_progress_bar(),
            skip_invalid_records: false,
            default_output_format: OutputFormat::Table,
            max_rows_per_group: None,
        }
    }
}

// Default value functions for serde
fn default_enable_progress_bar() -> bool {
    true
}

impl FinderConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `DOCFINDER_DATA_PATH`: path to the panel file
    /// - `DOCFINDER_PROGRESS_BAR`: "true" or "false"
    /// - `DOCFINDER_SKIP_INVALID`: "true" or "false"
    /// - `DOCFINDER_OUTPUT_FORMAT`: "table", "json" or "csv"
    /// - `DOCFINDER_MAX_ROWS`: number, 0 for no limit
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variables on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("DOCFINDER_DATA_PATH") {
            if !val.trim().is_empty() {
                self.data_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("DOCFINDER_PROGRESS_BAR") {
            self.enable_progress_bar = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("DOCFINDER_SKIP_INVALID") {
            self.skip_invalid_records = val.to_lowercase() == "true";
        }

        if let Ok(val) = std::env::var("DOCFINDER_OUTPUT_FORMAT") {
            if let Ok(format) = val.parse() {
                self.default_output_format = format;
            }
        }

        if let Ok(val) = std::env::var("DOCFINDER_MAX_ROWS") {
            if let Ok(max) = val.parse::<usize>() {
                self.max_rows_per_group = Some(max).filter(|&n| n > 0);
            }
        }

        self
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::FinderError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::FinderError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/docfinder/config.toml` on Linux
    /// or `%APPDATA%\docfinder\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "docfinder")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default file, then environment, then defaults
    ///
    /// Environment variables override values from the file.
    pub fn load() -> crate::Result<Self> {
        let base = match Self::default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }
}

// Global configuration support
use std::sync::RwLock;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<Option<FinderConfig>> = RwLock::new(None);
}

/// Set the global configuration
pub fn set_global_config(config: FinderConfig) {
    let mut guard = GLOBAL_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(config);
}

/// Get the global configuration (or environment/defaults if not set)
pub fn global_config() -> FinderConfig {
    GLOBAL_CONFIG.read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .cloned()
        .unwrap_or_else(FinderConfig::from_env)
}

/// Builder for customizing configuration
#[derive(Default)]
pub struct ConfigBuilder {
    config: FinderConfig,
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel file path
    pub fn data_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.data_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set progress bar enabled
    pub fn progress_bar(mut self, enabled: bool) -> Self {
        self.config.enable_progress_bar = enabled;
        self
    }

    /// Set skip invalid records
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    /// Set the default output format
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.default_output_format = format;
        self
    }

    /// Set rows shown per region (0 = no limit)
    pub fn max_rows_per_group(mut self, max: usize) -> Self {
        self.config.max_rows_per_group = Some(max).filter(|&n| n > 0);
        self
    }

    /// Build the configuration
    pub fn build(self) -> FinderConfig {
        self.config
    }
}
