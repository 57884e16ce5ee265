use std::path::PathBuf;

/// Failures of the collaborators driven by the learning loop.
///
/// None of these are recovered locally; they end the training session.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("game failed: {0}")]
    Game(String),

    #[error("model forward pass failed: {0}")]
    Model(String),

    #[error("trainer update failed: {0}")]
    Trainer(String),

    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors that can occur while saving or loading model weights.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to save network weights to {path}: {reason}")]
    Save { path: PathBuf, reason: String },

    #[error("failed to load network weights from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write metadata to {path}: {source}")]
    MetadataWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
