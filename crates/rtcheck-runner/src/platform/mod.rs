//! Process-tree placement and termination.
//!
//! On Unix the child leads its own process group and the whole group is
//! signalled. On Windows the child is assigned to a Job Object that is
//! terminated as a unit.

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows_job;

#[cfg(unix)]
pub(crate) use unix::{ProcessTree, place_in_new_group};
#[cfg(windows)]
pub(crate) use windows_job::ProcessTree;

#[cfg(not(any(unix, windows)))]
pub(crate) struct ProcessTree {
    pid: Option<u32>,
}

#[cfg(not(any(unix, windows)))]
impl ProcessTree {
    pub(crate) fn attach(
        child: &tokio::process::Child,
    ) -> Result<Self, crate::error::SupervisorError> {
        Ok(Self { pid: child.id() })
    }

    pub(crate) async fn kill(&self, _grace: std::time::Duration) {
        tracing::warn!(pid = ?self.pid, "process-tree termination is not supported on this platform");
    }
}
