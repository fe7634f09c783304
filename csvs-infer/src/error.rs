//! Error types for csvs-infer.
//!
//! Classification itself is total and never fails; these errors only come
//! from reading tables, loading literal configuration and writing schemas.

use thiserror::Error;

/// The main error type for the csvs-infer library.
#[derive(Error, Debug)]
pub enum InferError {
    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while parsing the delimited input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured literal is not a valid regular expression.
    #[error("Invalid literal '{name}': {source}")]
    InvalidLiteral {
        /// Name of the literal, e.g. `XsdDateLiteral`
        name: String,
        #[source]
        source: regex::Error,
    },

    /// The literal configuration could not be parsed.
    #[error("Literal configuration error: {0}")]
    LiteralConfig(#[from] serde_yaml::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input file type is not handled.
    #[error("File type for '{0}' not supported, only .csv and .tsv files are supported")]
    UnsupportedFileType(String),
}

/// A type alias for `Result<T, InferError>`.
pub type Result<T> = std::result::Result<T, InferError>;

impl InferError {
    /// Creates an invalid literal error for the named literal.
    pub fn invalid_literal(name: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidLiteral {
            name: name.into(),
            source,
        }
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
