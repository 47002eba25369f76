use std::time::Duration;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
    JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JobObjectExtendedLimitInformation,
    SetInformationJobObject, TerminateJobObject,
};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_ALL_ACCESS};

use crate::error::SupervisorError;

/// Job Object holding a supervised child and everything it starts.
///
/// The job is created with `JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE`, so dropping
/// the handle also terminates any survivors.
pub(crate) struct ProcessTree {
    job: HANDLE,
}

// SAFETY: a job HANDLE is an opaque kernel reference usable from any thread.
unsafe impl Send for ProcessTree {}
unsafe impl Sync for ProcessTree {}

impl Drop for ProcessTree {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.job);
        }
    }
}

impl ProcessTree {
    pub(crate) fn attach(child: &tokio::process::Child) -> Result<Self, SupervisorError> {
        let tree = Self::create()?;

        if let Some(pid) = child.id() {
            unsafe {
                let process = OpenProcess(PROCESS_ALL_ACCESS, false, pid).map_err(|e| {
                    SupervisorError::Platform {
                        reason: format!("Failed to open process {pid} for job assignment: {e}"),
                    }
                })?;

                let assigned = AssignProcessToJobObject(tree.job, process);
                let _ = CloseHandle(process);
                assigned.map_err(|e| SupervisorError::Platform {
                    reason: format!("Failed to assign process {pid} to Job Object: {e}"),
                })?;
            }
        }

        Ok(tree)
    }

    fn create() -> Result<Self, SupervisorError> {
        unsafe {
            let job = CreateJobObjectW(None, None).map_err(|e| SupervisorError::Platform {
                reason: format!("Failed to create Job Object: {e}"),
            })?;
            let tree = Self { job };

            let mut info: JOBOBJECT_EXTENDED_LIMIT_INFORMATION = std::mem::zeroed();
            info.BasicLimitInformation.LimitFlags = JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE;

            SetInformationJobObject(
                tree.job,
                JobObjectExtendedLimitInformation,
                (&raw const info).cast(),
                std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
            )
            .map_err(|e| SupervisorError::Platform {
                reason: format!("Failed to configure Job Object: {e}"),
            })?;

            Ok(tree)
        }
    }

    /// Windows has no graceful group signal; the grace period is ignored.
    pub(crate) async fn kill(&self, _grace: Duration) {
        unsafe {
            if let Err(err) = TerminateJobObject(self.job, 1) {
                tracing::debug!(error = %err, "TerminateJobObject failed");
            }
        }
    }
}
