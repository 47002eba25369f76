//! The scan-execute-aggregate loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rtcheck_environment::Cleaner;
use rtcheck_model::{SystemUnderTest, TestResult, TestResults};
use rtcheck_runner::CancellationSource;
use rtcheck_utils::logging::test_span;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};
use walkdir::WalkDir;

use crate::launcher::Launcher;
use crate::log::{TIMEOUT_MARKER, TestLog};
use crate::output::TestOutput;
use crate::parser::{MANIFEST_FILE, TestParser};

pub struct TestRunner {
    system: Arc<SystemUnderTest>,
    cleaner: Arc<dyn Cleaner>,
    launcher: Arc<dyn Launcher>,
    nuget_config: Option<String>,
    parser: TestParser,
}

impl TestRunner {
    pub fn new(
        system: Arc<SystemUnderTest>,
        cleaner: Arc<dyn Cleaner>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            system,
            cleaner,
            launcher,
            nuget_config: None,
            parser: TestParser::new(),
        }
    }

    /// `nuget.config` contents placed in every executed test's directory.
    #[must_use]
    pub fn with_nuget_config(mut self, nuget_config: Option<String>) -> Self {
        self.nuget_config = nuget_config;
        self
    }

    /// Every `test.json` under `root`, ordered by containing directory so
    /// runs are reproducible across machines.
    #[must_use]
    pub fn discover(root: &Path) -> Vec<PathBuf> {
        let mut manifests: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable path");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE)
            .map(walkdir::DirEntry::into_path)
            .collect();

        manifests.sort_by(|a, b| a.parent().cmp(&b.parent()));
        manifests
    }

    /// Run every test under `root`. `default_timeout` is scaled by each
    /// manifest's multiplier; `Duration::ZERO` disables timeouts.
    pub async fn scan_and_run(
        &self,
        outputs: &mut [Box<dyn TestOutput>],
        root: &Path,
        default_timeout: Duration,
    ) -> TestResults {
        for output in outputs.iter_mut() {
            output.at_startup().await;
        }

        let mut results = TestResults::new();
        let mut failed = Vec::new();

        for manifest in Self::discover(root) {
            for output in outputs.iter_mut() {
                output.before_test().await;
            }

            self.cleaner.clean_caches();

            let test = match self
                .parser
                .parse(Arc::clone(&self.system), &manifest, self.nuget_config.as_deref())
            {
                Ok(test) => test,
                Err(e) => {
                    warn!("Unable to parse {}: {e}", manifest.display());
                    continue;
                }
            };

            let name = test.name().to_string();
            let span = test_span(&name);

            for output in outputs.iter_mut() {
                output.after_parsing(&name, test.is_enabled()).await;
            }

            let timeout = test.descriptor().timeout(default_timeout);
            let source = CancellationSource::with_optional_timeout(timeout);
            let log = TestLog::new();

            if test.descriptor().cleanup {
                self.cleaner.clean_project_local(test.directory());
            }

            let started = Instant::now();
            let result = match test
                .run(self.launcher.as_ref(), &log, &source.token())
                .instrument(span.clone())
                .await
            {
                Ok(result) => result,
                Err(cancelled) => {
                    span.in_scope(|| warn!(elapsed = ?cancelled.elapsed, "Timed out"));
                    log.note(TIMEOUT_MARKER);
                    TestResult::Failed
                }
            };
            let elapsed = started.elapsed();
            span.in_scope(|| debug!(%result, ?elapsed, "Finished"));

            results.record(result);
            if result == TestResult::Failed {
                failed.push(name.clone());
            }

            for output in outputs.iter_mut() {
                output.after_running(&name, result, &log, elapsed).await;
            }
        }

        info!(
            total = results.total,
            passed = results.passed,
            failed = results.failed,
            skipped = results.skipped,
            "Scan complete"
        );

        if results.failed > 0 {
            for output in outputs.iter_mut() {
                output.print_failed_tests(&failed).await;
            }
        }
        for output in outputs.iter_mut() {
            output.after_all(&results).await;
        }

        results
    }
}
