use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use rtcheck_runner::OutputSinks;

/// Appended to a test's log when its timeout fires.
pub const TIMEOUT_MARKER: &str = "[[TIMEOUT]]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
    /// Lines written by rtcheck itself (launch lines, exit codes).
    Runner,
}

/// Line log of everything that happened while a test ran, in arrival order.
///
/// Clones share the same buffer, so the log can be handed to output sinks
/// running on reader tasks.
#[derive(Clone, Default)]
pub struct TestLog {
    lines: Arc<Mutex<Vec<(LogStream, String)>>>,
}

impl TestLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, stream: LogStream, line: impl Into<String>) {
        self.lock().push((stream, line.into()));
    }

    pub fn note(&self, line: impl Into<String>) {
        self.push(LogStream::Runner, line);
    }

    /// Sinks that append process output to this log.
    #[must_use]
    pub fn sinks(&self) -> OutputSinks {
        let stdout = self.clone();
        let stderr = self.clone();
        OutputSinks::new(
            move |line| stdout.push(LogStream::Stdout, line),
            move |line| stderr.push(LogStream::Stderr, line),
        )
    }

    /// All lines, newline-terminated.
    #[must_use]
    pub fn combined(&self) -> String {
        self.collect(|_, _| true)
    }

    /// Process stdout plus runner lines.
    #[must_use]
    pub fn standard_output(&self) -> String {
        self.collect(|stream, _| stream != LogStream::Stderr)
    }

    /// Process stderr plus the timeout marker, if any.
    #[must_use]
    pub fn standard_error(&self) -> String {
        self.collect(|stream, line| match stream {
            LogStream::Stderr => true,
            LogStream::Runner => line == TIMEOUT_MARKER,
            LogStream::Stdout => false,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.lock()
            .iter()
            .any(|(stream, line)| *stream == LogStream::Runner && line == TIMEOUT_MARKER)
    }

    fn collect(&self, keep: impl Fn(LogStream, &str) -> bool) -> String {
        let lines = self.lock();
        let mut out = String::new();
        for (_, line) in lines.iter().filter(|(stream, line)| keep(*stream, line)) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(LogStream, String)>> {
        // A panicking sink cannot leave a half-written line behind.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for TestLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestLog")
            .field("lines", &self.lock().len())
            .finish()
    }
}
