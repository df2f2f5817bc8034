//! Keyboard command input.
//!
//! A plain thread reads stdin lines (the loop itself never blocks on input)
//! and forwards every recognised key over a channel that the loop drains
//! between ticks.

use std::io::BufRead;
use std::thread;

use contracts::{Command, CommandSource};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Channel end polled by the read loop
#[derive(Debug)]
pub struct ChannelCommands(mpsc::UnboundedReceiver<Command>);

impl ChannelCommands {
    pub fn new(rx: mpsc::UnboundedReceiver<Command>) -> Self {
        Self(rx)
    }
}

impl CommandSource for ChannelCommands {
    fn poll(&mut self) -> Option<Command> {
        self.0.try_recv().ok()
    }
}

/// Keys of one input line, in order; unknown keys are skipped
pub fn parse_line(line: &str) -> Vec<Command> {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            let command = Command::from_key(c.to_ascii_lowercase());
            if command.is_none() {
                debug!(key = %c, "unmapped key ignored");
            }
            command
        })
        .collect()
}

/// Start the stdin reader.
///
/// The thread ends on EOF or once the loop has dropped its receiver.
pub fn spawn_keyboard_reader(tx: mpsc::UnboundedSender<Command>) {
    let spawned = thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                for command in parse_line(&line) {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
            }
            debug!("keyboard input closed");
        });

    if let Err(e) = spawned {
        warn!(error = %e, "keyboard reader unavailable, only signals can stop the loop");
    }
}
