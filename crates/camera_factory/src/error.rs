//! Camera Factory error types

use contracts::{ContractError, Serial};
use thiserror::Error;

/// Camera Factory specific error
#[derive(Debug, Error)]
pub enum CameraFactoryError {
    /// Device scan failed
    #[error("device scan failed: {message}")]
    ScanFailed { message: String },

    /// No device found on the bus
    #[error("no cameras found")]
    NoDevices,

    /// Driver has no device for a binding
    #[error("driver has no device at index {index} for serial '{serial}'")]
    DeviceMissing { serial: Serial, index: u32 },

    /// Start failed
    #[error("failed to start camera '{serial}': {source}")]
    StartFailed {
        serial: Serial,
        #[source]
        source: ContractError,
    },

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl CameraFactoryError {
    /// Create scan error
    pub fn scan(message: impl Into<String>) -> Self {
        Self::ScanFailed {
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CameraFactoryError>;
