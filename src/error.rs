// src/error.rs

//! Error types for module operations

use thiserror::Error;

/// Errors raised by module loading, resolution and state changes
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot load from cache dir: {0}")]
    LoadCache(String),

    #[error("Missing file *modules.yaml in metadata cache dir: {0}")]
    MissingMetadata(String),

    #[error("No such module: {0}")]
    NoModule(String),

    #[error("No such module: {0} or active stream (enable a stream first)")]
    NoActiveStream(String),

    #[error("No such stream {stream} in {module}")]
    NoStream { module: String, stream: String },

    #[error("No such version {version} in {module}:{stream}")]
    NoVersion {
        module: String,
        stream: String,
        version: u64,
    },

    #[error("No such profile: {profile}. Possible profiles: {possible}")]
    NoProfile { profile: String, possible: String },

    #[error("No profile specified for {0} and no default profile is defined")]
    NoDefaultProfile(String),

    #[error("Profile not installed: {0}")]
    ProfileNotInstalled(String),

    #[error("Module {0} is not enabled")]
    NotEnabled(String),

    #[error("Stream not enabled. Skipping {module}:{stream}")]
    StreamNotEnabled { module: String, stream: String },

    #[error("Cannot add {found} to module stream {expected}")]
    StreamMismatch { expected: String, found: String },

    #[error("Invalid package artifact: {0}")]
    InvalidArtifact(String),

    #[error("Invalid module name pattern '{0}': {1}")]
    InvalidPattern(String, String),

    #[error("Invalid version '{0}': {1}")]
    InvalidVersion(String, String),

    #[error("Failed to parse module metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),

    #[error("Failed to parse {path}: {source}")]
    ConfParse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Failed to serialize module config: {0}")]
    ConfSerialize(#[from] toml::ser::Error),

    #[error("Package operation failed: {0}")]
    Goal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for module operations
pub type Result<T> = std::result::Result<T, Error>;
