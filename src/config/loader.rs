use std::fs;
use std::path::Path;

use tracing::debug;

use super::types::PlanFile;
use crate::error::ConfigError;

/// Read and parse a plan file, dispatching on its extension.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, or does not deserialize into a plan.
pub fn load_plan_file(path: &Path) -> Result<PlanFile, ConfigError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ConfigError::MissingExtension)?;

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadPlan {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Loading plan from {}", path.display());
    match extension.to_ascii_lowercase().as_str() {
        "toml" => toml::from_str(&contents).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        }),
        "json" => serde_json::from_str(&contents).map_err(|source| ConfigError::ParseJson {
            path: path.to_path_buf(),
            source,
        }),
        other => Err(ConfigError::UnsupportedExtension {
            ext: other.to_owned(),
        }),
    }
}
