use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read plan '{path}': {source}")]
    ReadPlan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML plan '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON plan '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported plan extension '{ext}'. Use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Plan file must have .toml or .json extension.")]
    MissingExtension,
    #[error("Plan root must be a controller, not a sampler.")]
    SamplerAtRoot,
    #[error("Loop controller '{name}' must have loops >= 1 (omit for infinite).")]
    ZeroLoops { name: String },
    #[error("Invalid sender policy '{value}': {reason}")]
    InvalidSenderPolicy { value: String, reason: String },
    #[error("Run setting '{field}' must be >= 1.")]
    FieldMustBePositive { field: &'static str },
}
