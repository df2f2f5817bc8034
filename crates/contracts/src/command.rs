//! Operator commands and their input source

use serde::{Deserialize, Serialize};

/// Loop-control actions, applied between ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Leave the loop and release every camera
    Quit,
    /// Buffer every complete tick until the next commit
    Arm,
    /// Export buffered frame sets and start a fresh sampling epoch
    Commit,
    /// Flush every camera's driver buffers and reset the tick index
    Flush,
}

impl Command {
    /// Keyboard mapping: `q` quit, `s` arm, `c` commit, `f` flush
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'q' => Some(Self::Quit),
            's' => Some(Self::Arm),
            'c' => Some(Self::Commit),
            'f' => Some(Self::Flush),
            _ => None,
        }
    }
}

/// Source of operator commands (keyboard, window events, ...)
pub trait CommandSource {
    /// Return the next pending command without blocking
    fn poll(&mut self) -> Option<Command>;
}
