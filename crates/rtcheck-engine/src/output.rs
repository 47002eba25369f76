use std::time::Duration;

use async_trait::async_trait;
use rtcheck_model::{TestResult, TestResults};

use crate::log::TestLog;

/// Observer of a scan, notified in execution order. Every hook defaults to
/// doing nothing.
#[async_trait]
pub trait TestOutput: Send {
    async fn at_startup(&mut self) {}

    /// Before a manifest is parsed.
    async fn before_test(&mut self) {}

    async fn after_parsing(&mut self, _name: &str, _enabled: bool) {}

    async fn after_running(
        &mut self,
        _name: &str,
        _result: TestResult,
        _log: &TestLog,
        _elapsed: Duration,
    ) {
    }

    /// Only called when at least one test failed; names in execution order.
    async fn print_failed_tests(&mut self, _failed: &[String]) {}

    async fn after_all(&mut self, _results: &TestResults) {}
}
