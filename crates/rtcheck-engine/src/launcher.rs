use std::time::Duration;

use async_trait::async_trait;
use rtcheck_runner::{CancellationToken, CommandSpec, OutputSinks, ProcessSupervisor, SupervisorError};
use thiserror::Error;
use tracing::warn;

use crate::log::TestLog;

/// The test's cancellation token fired before it finished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("test cancelled after {elapsed:?}")]
pub struct Cancelled {
    pub elapsed: Duration,
}

/// Starts processes on behalf of tests.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(
        &self,
        spec: &CommandSpec,
        sinks: &OutputSinks,
        token: &CancellationToken,
    ) -> Result<i32, SupervisorError>;
}

#[async_trait]
impl Launcher for ProcessSupervisor {
    async fn launch(
        &self,
        spec: &CommandSpec,
        sinks: &OutputSinks,
        token: &CancellationToken,
    ) -> Result<i32, SupervisorError> {
        self.run(spec, sinks, token).await
    }
}

/// Launch `spec` with its output going to `log`, recording the launch line
/// and exit code there too. `Ok(None)` means the process could not be run.
pub(crate) async fn run_logged(
    launcher: &dyn Launcher,
    spec: &CommandSpec,
    log: &TestLog,
    token: &CancellationToken,
) -> Result<Option<i32>, Cancelled> {
    log.note(spec.to_string());

    match launcher.launch(spec, &log.sinks(), token).await {
        Ok(code) => {
            log.note(format!("Process Exit Code: {code}"));
            Ok(Some(code))
        }
        Err(SupervisorError::Cancelled { elapsed }) => {
            log.note("Process wait for exit cancelled.");
            Err(Cancelled { elapsed })
        }
        Err(e) => {
            warn!(program = %spec.program_display(), error = %e, "Unable to run process");
            log.note(e.to_string());
            Ok(None)
        }
    }
}
