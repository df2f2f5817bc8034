//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// Startup failures reported before the loop begins
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Run loop worker did not finish cleanly
    #[error("Read loop aborted: {message}")]
    LoopAborted { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn loop_aborted(message: impl Into<String>) -> Self {
        Self::LoopAborted {
            message: message.into(),
        }
    }
}
