//! Error taxonomy for reflow
//!
//! Two classes of failure exist:
//! - configuration errors ([`ConfigError`], settings loading) are detected
//!   before any stream processing starts
//! - runtime errors (I/O, character map loading, a failed stage) abort the
//!   whole pipeline; nothing is retried

use std::path::PathBuf;

/// Convenience result type used across reflow.
pub type ReflowResult<T> = Result<T, ReflowError>;

/// Invalid combinations of otherwise well-formed settings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("flag --overwrite is invalid without flag --output")]
    OverwriteWithoutOutput,

    #[error("flag --keepnewline is invalid without flag --wordwrap")]
    KeepNewlineWithoutWordWrap,
}

/// Failures while loading a substitution map file.
#[derive(thiserror::Error, Debug)]
pub enum CharMapError {
    #[error("cannot read map file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed map file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error returned by the library.
#[derive(thiserror::Error, Debug)]
pub enum ReflowError {
    /// Settings were loaded but describe an invalid combination.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The settings layers could not be read or deserialized.
    #[error("cannot load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("cannot load character map {}: {source}", path.display())]
    CharMap {
        path: PathBuf,
        #[source]
        source: CharMapError,
    },

    /// Opening, reading or writing one of the streams failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline task panicked or was cancelled before closing its output.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl ReflowError {
    /// Build a [`ReflowError::Io`] with a short description of the operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a [`ReflowError::Stage`] value.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to the configuration class.
    ///
    /// The command line reports these together with its usage text.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Settings(_))
    }
}
