//! Configuration for the validation engine

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds the engine applies. Passed explicitly to every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Overall completeness below this raises LOW_COMPLETENESS
    #[serde(default = "default_completeness_target")]
    pub completeness_target: f64,

    /// Per-field completeness below this raises LOW_FIELD_COMPLETENESS
    #[serde(default = "default_field_completeness_floor")]
    pub field_completeness_floor: f64,

    /// How many worksheet rows to search for the header row
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

fn default_completeness_target() -> f64 {
    0.95
}

fn default_field_completeness_floor() -> f64 {
    0.80
}

fn default_header_scan_rows() -> usize {
    50
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            completeness_target: default_completeness_target(),
            field_completeness_floor: default_field_completeness_floor(),
            header_scan_rows: default_header_scan_rows(),
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ValidatorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;
        config.check()?;
        Ok(config)
    }

    /// Load `path` if the file exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject ratios outside `[0, 1]` and a zero header scan window.
    pub fn check(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("completeness_target", self.completeness_target),
            ("field_completeness_floor", self.field_completeness_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key,
                    message: format!("{} is not between 0 and 1", value),
                });
            }
        }
        if self.header_scan_rows == 0 {
            return Err(ConfigError::OutOfRange {
                key: "header_scan_rows",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
