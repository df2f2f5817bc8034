//! Command router
//!
//! Applies operator commands to the loop and the capture workflow. Commands
//! are only ever applied between ticks.

use capture::{CaptureWorkflow, CommitReport, ExportSink};
use contracts::Command;
use tracing::info;

use crate::engine::SyncEngine;
use crate::state::ExitFlag;

/// What a routed command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Quit,
    Armed,
    Committed(CommitReport),
    Flushed,
}

/// Maps commands onto loop and workflow state
#[derive(Debug, Clone)]
pub struct CommandRouter {
    exit: ExitFlag,
}

impl CommandRouter {
    pub fn new(exit: ExitFlag) -> Self {
        Self { exit }
    }

    /// Token set by `Quit`
    pub fn exit_flag(&self) -> &ExitFlag {
        &self.exit
    }

    pub fn route(
        &self,
        command: Command,
        engine: &mut SyncEngine,
        workflow: &mut CaptureWorkflow,
        exporter: &mut dyn ExportSink,
    ) -> Routed {
        info!(?command, "command received");
        match command {
            Command::Quit => {
                self.exit.trigger();
                Routed::Quit
            }
            Command::Arm => {
                workflow.arm();
                Routed::Armed
            }
            Command::Commit => {
                let report = workflow.commit(exporter);
                engine.reset_tick_index();
                Routed::Committed(report)
            }
            Command::Flush => {
                engine.flush_all();
                Routed::Flushed
            }
        }
    }
}
