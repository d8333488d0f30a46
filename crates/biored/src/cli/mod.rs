//! CLI commands for the BIO-RED validator

pub mod batch;
pub mod error;
pub mod output;
pub mod templates;
pub mod validate;

use anyhow::Result;
use biored_validator::ValidatorConfig;
use std::path::Path;

use crate::cli::error::HelpfulError;

/// Resolve the validator config: explicit path, else `~/.biored/config.toml`
/// when present, else defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ValidatorConfig> {
    let loaded = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(HelpfulError::file_not_found(path).into());
            }
            ValidatorConfig::load(path)
        }
        None => ValidatorConfig::load_or_default(&biored_logging::default_config_path()),
    };
    loaded.map_err(|err| HelpfulError::invalid_config(&err).into())
}
