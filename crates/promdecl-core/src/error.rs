//! Shared error type across promdecl crates.

use thiserror::Error;

/// Stable error codes (used by callers that branch on the failure class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Identifier shadows a declaration operation.
    CollidingName,
    /// Missing or empty required argument.
    InvalidArgument,
    /// Required body not supplied.
    MissingBlock,
    /// Metrics engine refused to register an instrument.
    Registration,
    /// Runtime label set does not match the instrument.
    Labels,
    /// Push gateway delivery failed.
    Push,
    /// Invalid configuration.
    Config,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::CollidingName => "COLLIDING_NAME",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::MissingBlock => "MISSING_BLOCK",
            ErrorCode::Registration => "REGISTRATION",
            ErrorCode::Labels => "LABELS",
            ErrorCode::Push => "PUSH",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum Error {
    #[error("identifying an instrument with {0} would shadow a namespace operation")]
    CollidingName(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no block given: {0}")]
    MissingBlock(String),
    #[error("registration failed: {0}")]
    Registration(#[source] prometheus::Error),
    #[error("label mismatch: {0}")]
    Labels(#[source] prometheus::Error),
    #[error("push failed: {0}")]
    Push(#[source] prometheus::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::CollidingName(_) => ErrorCode::CollidingName,
            Error::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Error::MissingBlock(_) => ErrorCode::MissingBlock,
            Error::Registration(_) => ErrorCode::Registration,
            Error::Labels(_) => ErrorCode::Labels,
            Error::Push(_) => ErrorCode::Push,
            Error::Config(_) => ErrorCode::Config,
            Error::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            Error::Internal(_) => ErrorCode::Internal,
        }
    }
}
