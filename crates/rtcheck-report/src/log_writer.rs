//! Per-test log files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use rtcheck_engine::{TestLog, TestOutput};
use rtcheck_model::TestResult;
use rtcheck_utils::atomic_write::write_file_atomic;
use tracing::warn;

/// Writes `logfile-<name>.log` for every test that ran.
#[derive(Debug, Clone)]
pub struct LogWriter {
    directory: PathBuf,
}

impl LogWriter {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.directory.join(format!("logfile-{safe}.log"))
    }

    pub fn write(&self, name: &str, log: &TestLog) -> anyhow::Result<PathBuf> {
        let path = self.path_for(name);
        write_file_atomic(&path, &render(log))?;
        Ok(path)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[must_use]
pub fn render(log: &TestLog) -> String {
    format!(
        "# Standard Output:\n{}# Standard Error:\n{}",
        log.standard_output(),
        log.standard_error()
    )
}

#[async_trait]
impl TestOutput for LogWriter {
    async fn after_running(
        &mut self,
        name: &str,
        result: TestResult,
        log: &TestLog,
        _elapsed: Duration,
    ) {
        if result == TestResult::Skipped {
            return;
        }
        if let Err(e) = self.write(name, log) {
            warn!(test = name, error = %e, "Unable to write test log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtcheck_engine::LogStream;
    use tempfile::TempDir;

    #[test]
    fn test_render_sections() {
        let log = TestLog::new();
        log.note("Executing test.sh");
        log.push(LogStream::Stdout, "ok");
        log.push(LogStream::Stderr, "warning: x");

        assert_eq!(
            render(&log),
            "# Standard Output:\nExecuting test.sh\nok\n# Standard Error:\nwarning: x\n"
        );
    }

    #[test]
    fn test_timed_out_log_marks_both_sections() {
        let log = TestLog::new();
        log.push(LogStream::Stdout, "waiting");
        log.note(rtcheck_engine::TIMEOUT_MARKER);

        assert_eq!(
            render(&log),
            "# Standard Output:\nwaiting\n[[TIMEOUT]]\n# Standard Error:\n[[TIMEOUT]]\n"
        );
    }

    #[test]
    fn test_path_for_replaces_separators() {
        let writer = LogWriter::new("/logs");
        assert_eq!(writer.path_for("a/b"), PathBuf::from("/logs/logfile-a_b.log"));
    }

    #[tokio::test]
    async fn test_skipped_tests_get_no_file() {
        let temp = TempDir::new().unwrap();
        let mut writer = LogWriter::new(temp.path());
        let log = TestLog::new();
        log.note("line");

        writer
            .after_running("skipped", TestResult::Skipped, &log, Duration::ZERO)
            .await;
        writer
            .after_running("ran", TestResult::Failed, &log, Duration::ZERO)
            .await;

        assert!(!writer.path_for("skipped").exists());
        assert_eq!(
            std::fs::read_to_string(writer.path_for("ran")).unwrap(),
            "# Standard Output:\nline\n# Standard Error:\n"
        );
    }
}
