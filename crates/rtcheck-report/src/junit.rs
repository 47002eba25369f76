//! JUnit XML report, `results.xml` in the log directory.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rtcheck_engine::{TestLog, TestOutput};
use rtcheck_model::{TestResult, TestResults};
use rtcheck_utils::atomic_write::write_file_atomic;
use tracing::{info, warn};

pub const JUNIT_FILE_NAME: &str = "results.xml";

const SUITE_NAME: &str = "dotnet";
const CLASS_NAME: &str = "TestSuite";

#[derive(Debug, Clone, PartialEq)]
pub struct JUnitCase {
    pub name: String,
    pub result: TestResult,
    pub log: String,
    pub elapsed: Duration,
}

/// Collects every test and writes the report once the scan ends.
pub struct JUnitOutput {
    path: PathBuf,
    started: Option<DateTime<Utc>>,
    cases: Vec<JUnitCase>,
}

impl JUnitOutput {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: None,
            cases: Vec::new(),
        }
    }

    #[must_use]
    pub fn cases(&self) -> &[JUnitCase] {
        &self.cases
    }
}

#[async_trait]
impl TestOutput for JUnitOutput {
    async fn at_startup(&mut self) {
        self.started = Some(Utc::now());
    }

    async fn after_running(
        &mut self,
        name: &str,
        result: TestResult,
        log: &TestLog,
        elapsed: Duration,
    ) {
        self.cases.push(JUnitCase {
            name: name.to_string(),
            result,
            log: log.combined(),
            elapsed,
        });
    }

    async fn after_all(&mut self, results: &TestResults) {
        let xml = render(&self.cases, results, self.started);
        match write_file_atomic(&self.path, &xml) {
            Ok(_) => info!(path = %self.path.display(), "Wrote JUnit report"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "Unable to write JUnit report"),
        }
    }
}

/// Render the report. `timestamp` is omitted when `None`.
#[must_use]
pub fn render(cases: &[JUnitCase], results: &TestResults, timestamp: Option<DateTime<Utc>>) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");

    let _ = write!(
        xml,
        "<testsuite name=\"{SUITE_NAME}\" tests=\"{}\" failures=\"{}\" errors=\"0\"",
        results.total, results.failed
    );
    if results.skipped > 0 {
        let _ = write!(xml, " skipped=\"{}\"", results.skipped);
    }
    if let Some(timestamp) = timestamp {
        let _ = write!(
            xml,
            " timestamp=\"{}\"",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }

    if cases.is_empty() {
        xml.push_str(" />");
        return xml;
    }
    xml.push_str(">\n");

    for case in cases {
        let _ = write!(
            xml,
            "  <testcase name=\"{}\" classname=\"{CLASS_NAME}\" time=\"{:.3}\"",
            escape(&case.name),
            case.elapsed.as_secs_f64()
        );

        let mut children = String::new();
        match case.result {
            TestResult::Failed => {
                children.push_str("    <failure message=\"Test failed\" type=\"Failure\" />\n");
            }
            TestResult::Skipped => children.push_str("    <skipped />\n"),
            TestResult::Passed => {}
        }
        if !case.log.is_empty() {
            let _ = writeln!(children, "    <system-out>{}</system-out>", escape(&case.log));
        }

        if children.is_empty() {
            xml.push_str(" />\n");
        } else {
            let _ = write!(xml, ">\n{children}  </testcase>\n");
        }
    }

    xml.push_str("</testsuite>");
    xml
}

/// Escape markup characters and drop control characters XML 1.0 cannot
/// carry.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn case(name: &str, result: TestResult, log: &str) -> JUnitCase {
        JUnitCase {
            name: name.to_string(),
            result,
            log: log.to_string(),
            elapsed: Duration::from_millis(1500),
        }
    }

    fn totals(cases: &[JUnitCase]) -> TestResults {
        let mut results = TestResults::new();
        for case in cases {
            results.record(case.result);
        }
        results
    }

    #[test]
    fn test_empty_run() {
        assert_eq!(
            render(&[], &TestResults::new(), None),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<testsuite name=\"dotnet\" tests=\"0\" failures=\"0\" errors=\"0\" />"
        );
    }

    #[test]
    fn test_passed_case_with_log() {
        let cases = vec![case("foo", TestResult::Passed, "LOG")];
        assert_eq!(
            render(&cases, &totals(&cases), None),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<testsuite name=\"dotnet\" tests=\"1\" failures=\"0\" errors=\"0\">\n  \
<testcase name=\"foo\" classname=\"TestSuite\" time=\"1.500\">\n    \
<system-out>LOG</system-out>\n  \
</testcase>\n\
</testsuite>"
        );
    }

    #[test]
    fn test_failed_and_skipped_cases() {
        let cases = vec![
            case("bad", TestResult::Failed, "boom\n[[TIMEOUT]]\n"),
            case("later", TestResult::Skipped, ""),
        ];
        let xml = render(&cases, &totals(&cases), None);

        assert!(xml.contains("tests=\"2\" failures=\"1\" errors=\"0\" skipped=\"1\""));
        assert!(xml.contains("<failure message=\"Test failed\" type=\"Failure\" />"));
        assert!(xml.contains("<system-out>boom\n[[TIMEOUT]]\n</system-out>"));
        assert!(xml.contains("<testcase name=\"later\" classname=\"TestSuite\" time=\"1.500\">\n    <skipped />\n  </testcase>"));
    }

    #[test]
    fn test_escaping_and_control_characters() {
        let cases = vec![case("a<b>", TestResult::Passed, "x & \"y\"\u{1b}[31m\u{0}z")];
        let xml = render(&cases, &totals(&cases), None);

        assert!(xml.contains("name=\"a&lt;b&gt;\""));
        assert!(xml.contains("<system-out>x &amp; &quot;y&quot;[31mz</system-out>"));
    }

    #[test]
    fn test_timestamp_attribute() {
        let at = DateTime::parse_from_rfc3339("2025-10-24T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let xml = render(&[], &TestResults::new(), Some(at));
        assert!(xml.contains("timestamp=\"2025-10-24T14:30:00Z\""));
    }

    #[tokio::test]
    async fn test_after_all_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join(JUNIT_FILE_NAME);
        let mut output = JUnitOutput::new(&path);

        output.at_startup().await;
        let log = TestLog::new();
        log.note("hello");
        output
            .after_running("t", TestResult::Passed, &log, Duration::ZERO)
            .await;
        let mut results = TestResults::new();
        results.record(TestResult::Passed);
        output.after_all(&results).await;

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<system-out>hello\n</system-out>"));
        assert_eq!(output.cases().len(), 1);
    }
}
