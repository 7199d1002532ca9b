//! CLI command implementations.

pub mod analyze;
pub mod config;
pub mod profile;

use std::path::Path;

use tabscope::EngineConfig;

/// Read an engine configuration file, or fall back to the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            Ok(EngineConfig::from_json(&json)?)
        }
        None => Ok(EngineConfig::default()),
    }
}
