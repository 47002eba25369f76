use std::time::Duration;

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::SupervisorError;

/// Make the spawned child the leader of a fresh process group.
pub(crate) fn place_in_new_group(cmd: &mut tokio::process::Command) {
    unsafe {
        cmd.pre_exec(|| {
            libc::setpgid(0, 0);
            Ok(())
        });
    }
}

/// The process group of a supervised child.
pub(crate) struct ProcessTree {
    pgid: Option<Pid>,
}

impl ProcessTree {
    pub(crate) fn attach(child: &tokio::process::Child) -> Result<Self, SupervisorError> {
        let pgid = child
            .id()
            .and_then(|pid| i32::try_from(pid).ok())
            .map(Pid::from_raw);
        Ok(Self { pgid })
    }

    /// SIGTERM the group, wait `grace`, then SIGKILL it. A zero grace goes
    /// straight to SIGKILL.
    pub(crate) async fn kill(&self, grace: Duration) {
        let Some(pgid) = self.pgid else {
            return;
        };

        if !grace.is_zero() {
            if let Err(err) = killpg(pgid, Signal::SIGTERM) {
                debug!(pgid = pgid.as_raw(), error = %err, "SIGTERM to process group failed");
            }
            tokio::time::sleep(grace).await;
        }

        // ESRCH just means the whole group is already gone.
        if let Err(err) = killpg(pgid, Signal::SIGKILL) {
            debug!(pgid = pgid.as_raw(), error = %err, "SIGKILL to process group failed");
        }
    }
}
