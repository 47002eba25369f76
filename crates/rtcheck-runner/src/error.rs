//! Error types for process supervision

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture {stream} of {program}")]
    Pipe {
        program: String,
        stream: &'static str,
    },

    #[error("Failed to wait for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process tree setup failed: {reason}")]
    Platform { reason: String },

    /// The token fired before the process finished; the tree has been killed.
    #[error("Cancelled after {:.1}s", elapsed.as_secs_f64())]
    Cancelled { elapsed: Duration },
}

impl SupervisorError {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
