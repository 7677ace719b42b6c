//! Error types for the Scribe harness

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScribeError>;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Fixture not found: no row in {sheet} where {column} = {value}")]
    FixtureNotFound {
        sheet: String,
        column: String,
        value: String,
    },

    #[error("Fixture sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    #[error("Fixture column not found: {column} in sheet {sheet}")]
    ColumnNotFound { sheet: String, column: String },

    #[error("Workbook could not be read: {reason}")]
    WorkbookError { reason: String },

    #[error("Invalid scenario tag: {tag}")]
    InvalidTag { tag: String },

    #[error("HTTP exchange failed: {reason}")]
    HttpError { reason: String },

    #[error("Evidence rendering failed: {reason}")]
    RenderError { reason: String },

    #[error("Validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("Lifecycle error: {reason}")]
    LifecycleError { reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

impl ScribeError {
    /// Fatal errors abort the scenario; everything else is best-effort.
    pub fn is_fatal_setup(&self) -> bool {
        matches!(
            self,
            ScribeError::FixtureNotFound { .. }
                | ScribeError::SheetNotFound { .. }
                | ScribeError::ColumnNotFound { .. }
                | ScribeError::WorkbookError { .. }
                | ScribeError::InvalidTag { .. }
        )
    }
}
