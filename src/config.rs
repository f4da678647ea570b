use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "healthcare_dataset.csv";
pub const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV file with the patient records
    pub data_path: PathBuf,

    /// Rows shown in the Overview preview table
    pub preview_rows: usize,

    /// Bins in the age histogram
    pub histogram_bins: usize,

    /// Sample points on the age density curve
    pub kde_points: usize,

    /// Listen address for the web dashboard
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            preview_rows: 5,
            histogram_bins: 20,
            kde_points: 100,
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("healthcare-eda").join("config.toml"))
    }

    /// Load from `explicit` if given, else the default location, else defaults.
    /// An explicit path that cannot be read is an error; a malformed file
    /// anywhere only logs a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file {}", p.display()))?;
                return Ok(Self::parse_or_default(&content, p));
            }
            None => match Self::config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse_or_default(&content, &path)),
            Err(e) => {
                tracing::warn!("Failed to read config: {}", e);
                Ok(Self::default())
            }
        }
    }

    fn parse_or_default(content: &str, path: &Path) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Command-line overrides
    pub fn with_data_path(mut self, data_path: Option<PathBuf>) -> Self {
        if let Some(path) = data_path {
            self.data_path = path;
        }
        self
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            preview_rows: self.preview_rows,
            histogram_bins: self.histogram_bins.max(1),
            kde_points: self.kde_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_path, PathBuf::from("healthcare_dataset.csv"));
        assert_eq!(config.report_options(), ReportOptions::default());
        assert_eq!(config.server_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("preview_rows = 10\nserver_addr = \"127.0.0.1:8080\"\n").unwrap();

        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.histogram_bins, 20);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let config = AppConfig::parse_or_default("preview_rows = \"many\"", Path::new("bad.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/healthcare-eda.toml"))).is_err());
    }

    #[test]
    fn test_cli_override() {
        let config = AppConfig::default().with_data_path(Some(PathBuf::from("/tmp/other.csv")));
        assert_eq!(config.data_path, PathBuf::from("/tmp/other.csv"));

        let unchanged = AppConfig::default().with_data_path(None);
        assert_eq!(unchanged.data_path, PathBuf::from("healthcare_dataset.csv"));
    }

    #[test]
    fn test_zero_bins_clamped() {
        let config = AppConfig {
            histogram_bins: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.report_options().histogram_bins, 1);
    }
}
