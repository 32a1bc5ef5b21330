//! Error types for lockscope
//!
//! All modules use `LockscopeResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lockscope operations
pub type LockscopeResult<T> = Result<T, LockscopeError>;

/// All errors that can occur in lockscope
#[derive(Error, Debug)]
pub enum LockscopeError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Assets file errors
    #[error("Assets file not found: {0}")]
    AssetsNotFound(PathBuf),

    #[error("Failed to parse assets file {path}: {reason}")]
    AssetsParse { path: PathBuf, reason: String },

    #[error("Invalid version '{value}': {reason}")]
    VersionInvalid { value: String, reason: String },

    #[error("Invalid version range '{value}': {reason}")]
    VersionRangeInvalid { value: String, reason: String },

    // Service index errors
    #[error("Malformed service index: {0}")]
    ServiceIndexMalformed(String),

    #[error("Malformed service index entry #{index}: {reason}")]
    ServiceIndexEntry { index: usize, reason: String },

    // Control flow
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Background task failed: {0}")]
    Task(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    User(String),
}

impl LockscopeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an assets parse error
    pub fn assets_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::AssetsParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a service index entry error
    pub fn entry(index: usize, reason: impl Into<String>) -> Self {
        Self::ServiceIndexEntry {
            index,
            reason: reason.into(),
        }
    }

    /// Cancellation is a control signal, not a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::AssetsNotFound(_) => Some("Run a restore (dotnet restore) to produce the assets file"),
            Self::AssetsParse { .. } => Some("Re-run restore to regenerate the assets file"),
            Self::ConfigInvalid { .. } => Some("Run: lockscope config init --force"),
            _ => None,
        }
    }
}
