use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::command_spec::CommandSpec;
use crate::error::SupervisorError;
use crate::platform::{self, ProcessTree};

/// Receives one line of output (without the trailing newline).
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Where a supervised process's output goes, line by line, as it arrives.
#[derive(Clone)]
pub struct OutputSinks {
    pub stdout: LineSink,
    pub stderr: LineSink,
}

impl OutputSinks {
    pub fn new(
        stdout: impl Fn(&str) + Send + Sync + 'static,
        stderr: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            stdout: Arc::new(stdout),
            stderr: Arc::new(stderr),
        }
    }

    /// Send both streams to the same sink.
    pub fn merged(sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        let sink: LineSink = Arc::new(sink);
        Self {
            stdout: Arc::clone(&sink),
            stderr: sink,
        }
    }

    #[must_use]
    pub fn discard() -> Self {
        Self::merged(|_| {})
    }
}

impl std::fmt::Debug for OutputSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSinks").finish_non_exhaustive()
    }
}

// ============================================================================
// CompletionGuard
// ============================================================================

const PENDING: u8 = 0;
const EXITED: u8 = 1;
const CANCELLED: u8 = 2;

/// Single-owner completion flag: the first of {exit, cancellation} to claim
/// it finalises the run, the other is ignored.
#[derive(Debug, Default)]
struct CompletionGuard {
    state: AtomicU8,
}

impl CompletionGuard {
    fn claim(&self, outcome: u8) -> bool {
        self.state
            .compare_exchange(PENDING, outcome, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}

// ============================================================================
// ProcessSupervisor
// ============================================================================

/// Runs one external process to completion or cancellation.
///
/// The child gets a null stdin, piped stdout/stderr and its own process
/// tree (process group on Unix, Job Object on Windows). The run completes
/// naturally only once the child has exited *and* both pipes reached EOF, so
/// a backgrounded grandchild that keeps a pipe open holds the run open until
/// the token fires. On cancellation the whole tree is killed and reaped
/// before `run` returns.
#[derive(Debug, Clone, Default)]
pub struct ProcessSupervisor {
    kill_grace: Duration,
}

impl ProcessSupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time between SIGTERM and SIGKILL when tearing a tree down. Zero sends
    /// SIGKILL straight away. Ignored on Windows.
    #[must_use]
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Run `spec`, returning its exit code (`-1` when it died from a signal).
    ///
    /// # Errors
    ///
    /// [`SupervisorError::Cancelled`] when `token` fires first, after the
    /// process tree has been killed. Launch failures are
    /// [`SupervisorError::Spawn`].
    pub async fn run(
        &self,
        spec: &CommandSpec,
        sinks: &OutputSinks,
        token: &CancellationToken,
    ) -> Result<i32, SupervisorError> {
        let program = spec.program_display();

        let mut cmd = spec.to_tokio_command();
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        platform::place_in_new_group(&mut cmd);

        let mut child = cmd.spawn().map_err(|source| SupervisorError::Spawn {
            program: program.clone(),
            source,
        })?;
        let tree = ProcessTree::attach(&child)?;
        debug!(%program, pid = ?child.id(), "spawned");

        let stdout = child.stdout.take().ok_or_else(|| SupervisorError::Pipe {
            program: program.clone(),
            stream: "stdout",
        })?;
        let stderr = child.stderr.take().ok_or_else(|| SupervisorError::Pipe {
            program: program.clone(),
            stream: "stderr",
        })?;

        let guard = Arc::new(CompletionGuard::default());
        let mut stdout_task = spawn_reader(stdout, Arc::clone(&sinks.stdout), Arc::clone(&guard));
        let mut stderr_task = spawn_reader(stderr, Arc::clone(&sinks.stderr), Arc::clone(&guard));

        let outcome = {
            let exit_and_drain = async {
                let status = child.wait().await;
                // Join the readers so every line is delivered before returning.
                let _ = (&mut stdout_task).await;
                let _ = (&mut stderr_task).await;
                status
            };

            tokio::select! {
                status = exit_and_drain => Some(status),
                () = token.cancelled() => None,
            }
        };

        match outcome {
            Some(status) if guard.claim(EXITED) => {
                let status = status.map_err(|source| SupervisorError::Wait {
                    program: program.clone(),
                    source,
                })?;
                let code = status.code().unwrap_or(-1);
                debug!(%program, code, "exited");
                Ok(code)
            }
            _ => {
                guard.claim(CANCELLED);
                tree.kill(self.kill_grace).await;
                if let Err(err) = child.wait().await {
                    debug!(%program, error = %err, "failed to reap cancelled child");
                }
                stdout_task.abort();
                stderr_task.abort();

                let elapsed = token.elapsed();
                debug!(%program, elapsed_ms = elapsed.as_millis() as u64, "cancelled");
                Err(SupervisorError::Cancelled { elapsed })
            }
        }
    }
}

fn spawn_reader<R>(reader: R, sink: LineSink, guard: Arc<CompletionGuard>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if guard.is_cancelled() {
                        break;
                    }
                    let line = String::from_utf8_lossy(&buf);
                    sink(line.trim_end_matches(['\n', '\r']));
                }
                Err(err) => {
                    debug!(error = %err, "output pipe read failed");
                    break;
                }
            }
        }
    })
}
