//! Conversion error types

use thiserror::Error;

/// Conversion error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Raw buffer smaller than the declared layout
    #[error("raw buffer too short: expected {expected} bytes, got {actual}")]
    ShortBuffer { expected: usize, actual: usize },

    /// Sample width outside 1..=16 bits
    #[error("unsupported bit width: {0}")]
    UnsupportedBitWidth(u8),
}

/// Result alias
pub type Result<T> = std::result::Result<T, ConvertError>;
