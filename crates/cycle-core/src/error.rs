use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while normalizing and comparing billing cycles.
#[derive(Error, Debug)]
pub enum CycleError {
    /// A key the payload schema requires is absent.
    #[error("Missing field: {field}")]
    MissingField { field: String },

    /// A key is present but holds a value of the wrong JSON type.
    #[error("Type mismatch for {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A calendar date did not match `YYYY-MM-DD`.
    #[error("Invalid date format: {0}")]
    DateFormat(String),

    /// No holiday rules exist for the requested country code.
    #[error("Unsupported country: {0}")]
    UnsupportedCountry(String),

    /// A cycle index is outside the normalized batch.
    #[error("Cycle index {index} out of range for {len} cycles")]
    CycleIndex { index: usize, len: usize },

    /// Both sides of a comparison point at the same cycle.
    #[error("Cannot compare cycle {0} with itself")]
    SameCycle(usize),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CycleError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Whether this error aborts a whole normalization batch.
    ///
    /// Schema errors in any single raw record invalidate the entire batch;
    /// callers never receive a partial list of cycles.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::TypeMismatch { .. } | Self::DateFormat(_)
        )
    }
}

/// Convenience alias used throughout the cycle crates.
pub type Result<T> = std::result::Result<T, CycleError>;
