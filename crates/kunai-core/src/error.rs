use thiserror::Error;

/// Core error type with minimal dependencies.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required nested record is missing.
    #[error("Missing record: {0}")]
    MissingRecord(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
