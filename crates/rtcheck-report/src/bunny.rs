//! Output compatible with the dotnet-bunny test runner, for CI jobs that
//! parse its format.

use std::io::{self, Write};
use std::time::Duration;

use async_trait::async_trait;
use rtcheck_engine::{TestLog, TestOutput};
use rtcheck_model::{TestResult, TestResults};

pub const BUNNY: &str = "\n\n(\\_/)\n(^_^)\n@(\")(\")\n\n";

pub struct BunnyOutput {
    out: Box<dyn Write + Send>,
}

impl BunnyOutput {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Box::new(out) }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

#[async_trait]
impl TestOutput for BunnyOutput {
    async fn at_startup(&mut self) {
        let _ = writeln!(self.out, "{BUNNY}");
    }

    async fn after_parsing(&mut self, name: &str, enabled: bool) {
        if enabled {
            let _ = writeln!(self.out, "Running {name}");
        }
    }

    async fn after_running(
        &mut self,
        _name: &str,
        result: TestResult,
        _log: &TestLog,
        _elapsed: Duration,
    ) {
        let text = match result {
            TestResult::Passed => "PASS",
            TestResult::Failed => "FAIL - Code: 1",
            TestResult::Skipped => return,
        };
        let _ = writeln!(self.out, "Result: {text}\n");
    }

    async fn after_all(&mut self, results: &TestResults) {
        let _ = writeln!(
            self.out,
            "Total: {} Passed: {} Failed: {}",
            results.total, results.passed, results.failed
        );
        let _ = self.out.flush();
    }
}
