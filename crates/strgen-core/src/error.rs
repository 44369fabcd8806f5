//! Error types for strgen

use thiserror::Error;

/// strgen error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unbalanced conditional directives at line {line}: {message}")]
    UnbalancedDirectives { line: usize, message: String },

    #[error("Unknown conditional directive: #{0}")]
    UnknownDirective(String),

    #[error("Malformed entity: {0}")]
    MalformedEntity(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an `UnbalancedDirectives` error located at `offset` in `source`
    pub fn unbalanced(source: &str, offset: usize, message: impl Into<String>) -> Self {
        Error::UnbalancedDirectives {
            line: crate::span::line_of(source, offset),
            message: message.into(),
        }
    }
}

/// Result type alias for strgen
pub type Result<T> = std::result::Result<T, Error>;
