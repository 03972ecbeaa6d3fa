//! Configuration file loading

use std::fs;
use std::path::Path;

use tracing::debug;

use super::schema::AppConfig;
use crate::{Error, Result};

/// Load and validate a YAML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let config: AppConfig = serde_yaml::from_str(&text)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Load `path` if given, otherwise use the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
