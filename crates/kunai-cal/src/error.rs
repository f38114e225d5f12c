use thiserror::Error;

/// Calendar codec errors.
///
/// The variants map onto distinct failure classes and callers are expected
/// to branch on them:
/// - [`CalError::Format`] — malformed textual grammar; always surfaced,
///   never silently recovered (the one lenient-degrade path, in the GEO
///   codec, does not produce an error at all).
/// - [`CalError::InvalidData`] — a persisted record that is structurally
///   valid but semantically incomplete.
/// - [`CalError::Construction`] — building a derived artifact from already
///   accepted input failed; not retryable.
#[derive(Error, Debug)]
pub enum CalError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid persisted data: {0}")]
    InvalidData(String),

    #[error("Construction failure: {0}")]
    Construction(String),

    #[error(transparent)]
    Core(#[from] kunai_core::error::CoreError),
}

pub type CalResult<T> = std::result::Result<T, CalError>;
