//! Marshaling errors

use thiserror::Error;

/// Errors raised while encoding host data or decoding engine results.
///
/// Shape errors are raised before anything is handed to the engine. The
/// remaining variants mean the engine produced a buffer that violates the
/// layout contract; they are never confused with an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("point set is empty")]
    EmptyInput,

    #[error("invalid point set shape: {0}")]
    InvalidShape(String),

    #[error("unknown package type tag: {0}")]
    UnknownTypeTag(u32),

    #[error("malformed package: {0}")]
    MalformedPackage(String),

    #[error("malformed clustering result: {0}")]
    MalformedClusters(String),

    #[error("malformed dynamics result: {0}")]
    MalformedDynamics(String),
}

impl MarshalError {
    /// True for errors caused by the caller's input rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(self, MarshalError::EmptyInput | MarshalError::InvalidShape(_))
    }

    /// True when the engine returned something the decoders cannot read.
    pub fn is_protocol_error(&self) -> bool {
        !self.is_input_error()
    }
}

/// Result type for marshaling operations.
pub type MarshalResult<T> = Result<T, MarshalError>;
