//! Default human-readable output.

use std::io::{self, Write};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::style::{Color, Stylize};
use rtcheck_engine::{TestLog, TestOutput};
use rtcheck_model::{TestResult, TestResults};
use rtcheck_utils::logging::use_color;

/// Width the test name is padded to before its result marker.
pub const NAME_COLUMN_WIDTH: usize = 60;

/// One line per test, `<name padded to 60> [PASS]`, then a summary.
pub struct ConsoleOutput {
    out: Box<dyn Write + Send>,
    color: bool,
    /// Echo the log of failed tests.
    verbose: bool,
}

impl ConsoleOutput {
    pub fn new(out: impl Write + Send + 'static, color: bool) -> Self {
        Self {
            out: Box::new(out),
            color,
            verbose: false,
        }
    }

    /// Writes to stdout, coloured when stdout is a terminal.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), use_color())
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn marker(&self, result: TestResult) -> String {
        let text = result.marker();
        let color = match result {
            TestResult::Passed => Some(Color::Green),
            TestResult::Failed => Some(Color::Red),
            TestResult::Skipped => None,
        };
        match color {
            Some(color) if self.color => format!("{}", text.with(color)),
            _ => text.to_string(),
        }
    }
}

#[async_trait]
impl TestOutput for ConsoleOutput {
    async fn after_parsing(&mut self, name: &str, _enabled: bool) {
        let _ = write!(self.out, "{name:<NAME_COLUMN_WIDTH$}");
        let _ = self.out.flush();
    }

    async fn after_running(
        &mut self,
        _name: &str,
        result: TestResult,
        log: &TestLog,
        _elapsed: Duration,
    ) {
        let marker = self.marker(result);
        let _ = writeln!(self.out, "[{marker}]");
        if self.verbose && result == TestResult::Failed {
            let _ = write!(self.out, "{}", log.combined());
        }
    }

    async fn print_failed_tests(&mut self, failed: &[String]) {
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "The following tests failed:");
        for name in failed {
            let _ = writeln!(self.out, "    {name}");
        }
    }

    async fn after_all(&mut self, results: &TestResults) {
        let _ = writeln!(self.out);
        let _ = writeln!(
            self.out,
            "Total: {} Passed: {} Failed: {}",
            results.total, results.passed, results.failed
        );
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::SharedBuffer;

    #[tokio::test]
    async fn test_result_lines_without_color() {
        let buffer = SharedBuffer::default();
        let mut output = ConsoleOutput::new(buffer.clone(), false);

        output.after_parsing("hello-world", true).await;
        output
            .after_running("hello-world", TestResult::Passed, &TestLog::new(), Duration::ZERO)
            .await;
        output.after_parsing("skipped-one", false).await;
        output
            .after_running("skipped-one", TestResult::Skipped, &TestLog::new(), Duration::ZERO)
            .await;

        let text = buffer.contents();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("{:<60}[PASS]", "hello-world"));
        assert_eq!(lines[1], format!("{:<60}[SKIP]", "skipped-one"));
    }

    #[tokio::test]
    async fn test_colored_markers() {
        let buffer = SharedBuffer::default();
        let mut output = ConsoleOutput::new(buffer.clone(), true);

        output
            .after_running("a", TestResult::Failed, &TestLog::new(), Duration::ZERO)
            .await;

        let text = buffer.contents();
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("FAIL"));
    }

    #[tokio::test]
    async fn test_summary_and_failed_list() {
        let buffer = SharedBuffer::default();
        let mut output = ConsoleOutput::new(buffer.clone(), false);
        let mut results = TestResults::new();
        results.record(TestResult::Passed);
        results.record(TestResult::Failed);
        results.record(TestResult::Skipped);

        output
            .print_failed_tests(&["broken".to_string()])
            .await;
        output.after_all(&results).await;

        let text = buffer.contents();
        assert!(text.contains("The following tests failed:\n    broken\n"));
        assert!(text.ends_with("Total: 3 Passed: 1 Failed: 1\n"));
    }

    #[tokio::test]
    async fn test_verbose_echoes_failed_log() {
        let buffer = SharedBuffer::default();
        let mut output = ConsoleOutput::new(buffer.clone(), false).verbose(true);
        let log = TestLog::new();
        log.note("Process Exit Code: 2");

        output
            .after_running("x", TestResult::Failed, &log, Duration::ZERO)
            .await;

        assert!(buffer.contents().ends_with("[FAIL]\nProcess Exit Code: 2\n"));
    }
}
