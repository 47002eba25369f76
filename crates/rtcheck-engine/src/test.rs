//! One test case and its lifecycle.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rtcheck_model::{SystemUnderTest, TestDescriptor, TestResult};
use rtcheck_runner::CancellationToken;
use rtcheck_selectors::SelectionSkip;
use tracing::{debug, warn};

use crate::launcher::{Cancelled, Launcher};
use crate::log::TestLog;
use crate::patcher::patch_project;
use crate::strategy::strategy_for;

pub const NUGET_CONFIG_FILE: &str = "nuget.config";

/// A parsed manifest bound to the system it runs against. Whether it runs is
/// decided once, at construction.
#[derive(Debug)]
pub struct Test {
    directory: PathBuf,
    system: Arc<SystemUnderTest>,
    nuget_config: Option<String>,
    descriptor: TestDescriptor,
    skip: Option<SelectionSkip>,
}

impl Test {
    /// `skip` is the reason the test will not run, `None` to run it.
    #[must_use]
    pub fn new(
        directory: impl Into<PathBuf>,
        system: Arc<SystemUnderTest>,
        nuget_config: Option<String>,
        descriptor: TestDescriptor,
        skip: Option<SelectionSkip>,
    ) -> Self {
        Self {
            directory: directory.into(),
            system,
            nuget_config,
            descriptor,
            skip,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn descriptor(&self) -> &TestDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.skip.is_none()
    }

    #[must_use]
    pub fn skip_reason(&self) -> Option<&SelectionSkip> {
        self.skip.as_ref()
    }

    /// Run the test once. Only cancellation escapes as an error; every other
    /// problem is written to `log` and reported as [`TestResult::Failed`].
    pub async fn run(
        self,
        launcher: &dyn Launcher,
        log: &TestLog,
        token: &CancellationToken,
    ) -> Result<TestResult, Cancelled> {
        if let Some(reason) = &self.skip {
            debug!(test = %self.name(), %reason, "Skipping");
            return Ok(TestResult::Skipped);
        }

        let _nuget_config = match self.nuget_config.as_deref().filter(|c| !c.is_empty()) {
            Some(contents) => match NuGetConfigGuard::write(&self.directory, contents) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    log.note(format!("Unable to write {NUGET_CONFIG_FILE}: {e}"));
                    return Ok(TestResult::Failed);
                }
            },
            None => None,
        };

        match patch_project(&self.directory, &self.system.runtime_version) {
            Ok(Some(path)) => log.note(format!("Updated target framework in {}", path.display())),
            Ok(None) => {}
            Err(e) => {
                log.note(format!("Unable to update project file: {e}"));
                return Ok(TestResult::Failed);
            }
        }

        strategy_for(self.descriptor.kind)
            .execute(&self.directory, &self.system, launcher, log, token)
            .await
    }
}

/// `nuget.config` written into a test directory, removed again on drop.
#[derive(Debug)]
pub struct NuGetConfigGuard {
    path: PathBuf,
}

impl NuGetConfigGuard {
    pub fn write(directory: &Path, contents: &str) -> io::Result<Self> {
        let path = directory.join(NUGET_CONFIG_FILE);
        if path.exists() {
            warn!("overwriting {}", path.display());
        }
        std::fs::write(&path, contents)?;
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for NuGetConfigGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "Unable to remove");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rtcheck_model::{ExecutionKind, Version};
    use rtcheck_runner::{CommandSpec, OutputSinks, SupervisorError};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records launches and answers with scripted exit codes.
    #[derive(Default)]
    struct ScriptedLauncher {
        codes: Mutex<Vec<Result<i32, SupervisorError>>>,
        launched: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedLauncher {
        fn answering(codes: Vec<Result<i32, SupervisorError>>) -> Self {
            Self {
                codes: Mutex::new(codes),
                ..Self::default()
            }
        }

        fn launches(&self) -> Vec<String> {
            self.launched
                .lock()
                .unwrap()
                .iter()
                .map(|spec| format!("{} {}", spec.program_display(), spec.args_display()))
                .collect()
        }
    }

    #[async_trait]
    impl Launcher for ScriptedLauncher {
        async fn launch(
            &self,
            spec: &CommandSpec,
            sinks: &OutputSinks,
            _token: &CancellationToken,
        ) -> Result<i32, SupervisorError> {
            self.launched.lock().unwrap().push(spec.clone());
            (sinks.stdout)("output line");
            let mut codes = self.codes.lock().unwrap();
            if codes.is_empty() {
                Ok(0)
            } else {
                codes.remove(0)
            }
        }
    }

    fn system() -> Arc<SystemUnderTest> {
        Arc::new(
            SystemUnderTest::new("8.0.1".parse::<Version>().unwrap())
                .with_dotnet("/opt/dotnet/dotnet"),
        )
    }

    fn shell_test(dir: &Path, nuget_config: Option<&str>) -> Test {
        Test::new(
            dir,
            system(),
            nuget_config.map(String::from),
            TestDescriptor::new("t", "1.0", ExecutionKind::Shell),
            None,
        )
    }

    // ============================================================================
    // Skipping
    // ============================================================================

    #[tokio::test]
    async fn test_skipped_test_does_nothing() {
        let temp = TempDir::new().unwrap();
        let launcher = ScriptedLauncher::default();
        let log = TestLog::new();
        let test = Test::new(
            temp.path(),
            system(),
            Some("<configuration/>".to_string()),
            TestDescriptor::new("t", "1.0", ExecutionKind::Shell),
            Some(SelectionSkip::Disabled),
        );

        let result = test.run(&launcher, &log, &CancellationToken::none()).await;

        assert_eq!(result, Ok(TestResult::Skipped));
        assert!(launcher.launches().is_empty());
        assert!(log.is_empty());
        assert!(!temp.path().join(NUGET_CONFIG_FILE).exists());
    }

    // ============================================================================
    // Shell tests
    // ============================================================================

    #[tokio::test]
    async fn test_missing_entry_point_fails_without_launch() {
        let temp = TempDir::new().unwrap();
        let launcher = ScriptedLauncher::default();
        let log = TestLog::new();

        let result = shell_test(temp.path(), None)
            .run(&launcher, &log, &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Failed));
        assert!(launcher.launches().is_empty());
        assert!(log.combined().contains("Unable to find 'test.sh' in"));
    }

    #[tokio::test]
    async fn test_shell_passes_major_minor_and_logs_launch() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test.sh"), "#!/bin/sh\n").unwrap();
        let launcher = ScriptedLauncher::default();
        let log = TestLog::new();

        let result = shell_test(temp.path(), None)
            .run(&launcher, &log, &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Passed));
        let launches = launcher.launches();
        assert_eq!(launches.len(), 1);
        assert!(launches[0].ends_with("test.sh 8.0"));

        let combined = log.combined();
        assert!(combined.starts_with("Executing "));
        assert!(combined.contains("output line\n"));
        assert!(combined.ends_with("Process Exit Code: 0\n"));
    }

    #[tokio::test]
    async fn test_shell_nonzero_exit_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test.sh"), "#!/bin/sh\n").unwrap();
        let launcher = ScriptedLauncher::answering(vec![Ok(3)]);

        let result = shell_test(temp.path(), None)
            .run(&launcher, &TestLog::new(), &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Failed));
    }

    #[tokio::test]
    async fn test_spawn_error_is_a_failure() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test.sh"), "#!/bin/sh\n").unwrap();
        let launcher = ScriptedLauncher::answering(vec![Err(SupervisorError::Platform {
            reason: "no fork".to_string(),
        })]);
        let log = TestLog::new();

        let result = shell_test(temp.path(), None)
            .run(&launcher, &log, &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Failed));
        assert!(log.combined().contains("no fork"));
    }

    // ============================================================================
    // Build and test
    // ============================================================================

    #[tokio::test]
    async fn test_build_failure_skips_test_step() {
        let temp = TempDir::new().unwrap();
        let launcher = ScriptedLauncher::answering(vec![Ok(1)]);
        let test = Test::new(
            temp.path(),
            system(),
            None,
            TestDescriptor::new("x", "1.0", ExecutionKind::BuildAndTest),
            None,
        );

        let result = test
            .run(&launcher, &TestLog::new(), &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Failed));
        assert_eq!(launcher.launches(), vec!["/opt/dotnet/dotnet build"]);
    }

    #[tokio::test]
    async fn test_build_then_test() {
        let temp = TempDir::new().unwrap();
        let launcher = ScriptedLauncher::answering(vec![Ok(0), Ok(0)]);
        let test = Test::new(
            temp.path(),
            system(),
            None,
            TestDescriptor::new("x", "1.0", ExecutionKind::BuildAndTest),
            None,
        );

        let result = test
            .run(&launcher, &TestLog::new(), &CancellationToken::none())
            .await;

        assert_eq!(result, Ok(TestResult::Passed));
        assert_eq!(
            launcher.launches(),
            vec!["/opt/dotnet/dotnet build", "/opt/dotnet/dotnet test"]
        );
    }

    // ============================================================================
    // Cancellation and nuget.config
    // ============================================================================

    #[tokio::test]
    async fn test_cancellation_escapes_and_config_is_removed() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("test.sh"), "#!/bin/sh\n").unwrap();
        let launcher = ScriptedLauncher::answering(vec![Err(SupervisorError::Cancelled {
            elapsed: Duration::from_secs(5),
        })]);
        let log = TestLog::new();

        let result = shell_test(temp.path(), Some("<configuration/>"))
            .run(&launcher, &log, &CancellationToken::none())
            .await;

        assert_eq!(
            result,
            Err(Cancelled {
                elapsed: Duration::from_secs(5)
            })
        );
        assert!(log.combined().contains("Process wait for exit cancelled."));
        assert!(!temp.path().join(NUGET_CONFIG_FILE).exists());
    }

    #[test]
    fn test_guard_writes_and_removes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(NUGET_CONFIG_FILE);
        std::fs::write(&path, "old").unwrap();

        {
            let guard = NuGetConfigGuard::write(temp.path(), "new").unwrap();
            assert_eq!(std::fs::read_to_string(guard.path()).unwrap(), "new");
        }

        assert!(!path.exists());
    }
}
