//! Layered error definitions
//!
//! Categorized by source: config / binding / device / export

use std::path::PathBuf;

use thiserror::Error;

use crate::Serial;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Binding Errors =====
    /// A discovered device has no registered profile
    #[error("no profile registered for camera serial '{serial}'")]
    UnboundDevice { serial: Serial },

    // ===== Device Errors =====
    /// Open did not succeed within the retry bound
    #[error("failed to open camera {index} ('{serial}') after {attempts} attempts")]
    CameraOpen {
        serial: Serial,
        index: u32,
        attempts: u32,
    },

    /// Device parameter write failed; the device stays usable
    #[error("control write '{name}' = {value} failed on camera '{serial}': {message}")]
    ControlWrite {
        serial: Serial,
        name: String,
        value: i64,
        message: String,
    },

    /// Lifecycle call issued out of order
    #[error("camera '{serial}' cannot {operation} while {state}")]
    Lifecycle {
        serial: Serial,
        operation: &'static str,
        state: String,
    },

    /// Driver reported a failure
    #[error("driver error: {message}")]
    Driver { message: String },

    // ===== Export Errors =====
    /// One image of a batch failed to persist
    #[error("failed to export '{}': {message}", path.display())]
    ExportWrite { path: PathBuf, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create driver error
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create export write error
    pub fn export_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExportWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::UnboundDevice { .. }
                | Self::CameraOpen { .. }
        )
    }
}
