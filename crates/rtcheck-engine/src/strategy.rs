//! How each kind of test is executed.

use std::path::Path;

use async_trait::async_trait;
use rtcheck_model::{ExecutionKind, SystemUnderTest, TestResult};
use rtcheck_runner::{CancellationToken, CommandSpec};

use crate::launcher::{Cancelled, Launcher, run_logged};
use crate::log::TestLog;

/// Entry point of a shell test, relative to its directory.
pub const SHELL_ENTRY_POINT: &str = "test.sh";

#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    async fn execute(
        &self,
        directory: &Path,
        system: &SystemUnderTest,
        launcher: &dyn Launcher,
        log: &TestLog,
        token: &CancellationToken,
    ) -> Result<TestResult, Cancelled>;
}

#[must_use]
pub fn strategy_for(kind: ExecutionKind) -> &'static dyn ExecutionStrategy {
    match kind {
        ExecutionKind::Shell => &ShellStrategy,
        ExecutionKind::BuildAndTest => &BuildAndTestStrategy,
    }
}

/// Runs `test.sh <Major.Minor>` with only the sanitized environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellStrategy;

#[async_trait]
impl ExecutionStrategy for ShellStrategy {
    async fn execute(
        &self,
        directory: &Path,
        system: &SystemUnderTest,
        launcher: &dyn Launcher,
        log: &TestLog,
        token: &CancellationToken,
    ) -> Result<TestResult, Cancelled> {
        let entry_point = directory.join(SHELL_ENTRY_POINT);
        if !entry_point.is_file() {
            log.note(format!(
                "Unable to find '{SHELL_ENTRY_POINT}' in {}",
                directory.display()
            ));
            return Ok(TestResult::Failed);
        }

        let spec = CommandSpec::new(entry_point.as_os_str())
            .arg(system.runtime_version.major_minor())
            .cwd(directory)
            .clear_env()
            .envs(&system.environment_variables);

        let code = run_logged(launcher, &spec, log, token).await?;
        Ok(code.map_or(TestResult::Failed, TestResult::from_exit_code))
    }
}

/// `dotnet build`, then `dotnet test` when the build succeeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildAndTestStrategy;

impl BuildAndTestStrategy {
    fn step(system: &SystemUnderTest, directory: &Path, verb: &str) -> CommandSpec {
        CommandSpec::new(system.dotnet.as_os_str())
            .arg(verb)
            .cwd(directory)
            .clear_env()
            .envs(&system.environment_variables)
    }
}

#[async_trait]
impl ExecutionStrategy for BuildAndTestStrategy {
    async fn execute(
        &self,
        directory: &Path,
        system: &SystemUnderTest,
        launcher: &dyn Launcher,
        log: &TestLog,
        token: &CancellationToken,
    ) -> Result<TestResult, Cancelled> {
        for verb in ["build", "test"] {
            let spec = Self::step(system, directory, verb);
            match run_logged(launcher, &spec, log, token).await? {
                Some(0) => {}
                _ => return Ok(TestResult::Failed),
            }
        }
        Ok(TestResult::Passed)
    }
}
