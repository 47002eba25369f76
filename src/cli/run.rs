//! CLI entry point
//!
//! `run()` parses arguments, checks the test root, loads configuration,
//! probes the host and runs the scan. It prints every error itself and only
//! hands an [`ExitCode`] back to `main`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use rtcheck_engine::{TestOutput, TestRunner};
use rtcheck_environment::{HostCleaner, HostOptions, detect_system};
use rtcheck_feeds::{nuget_config_for, resolve_package_sources};
use rtcheck_model::TestResults;
use rtcheck_report::{BunnyOutput, ConsoleOutput, JUNIT_FILE_NAME, JUnitOutput, LogWriter};
use rtcheck_runner::ProcessSupervisor;
use rtcheck_utils::error::{RtcheckError, render_report};
use rtcheck_utils::logging::init_tracing;
use tracing::debug;

use super::args::Cli;
use crate::{Config, ExitCode};

/// Main CLI execution function.
///
/// Returns `Ok(())` when every executed test passed, otherwise the exit code
/// to terminate with. All output, including errors, is printed here.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            eprintln!("error: unable to determine the current directory: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let root = match resolve_test_root(cli.test_root.as_deref(), &cwd) {
        Ok(root) => root,
        Err(err) => return Err(report(&err)),
    };

    let config = match Config::discover_from(&root, &cli.to_cli_args()) {
        Ok(config) => config,
        Err(err) => {
            return Err(match err.downcast::<RtcheckError>() {
                Ok(err) => report(&err),
                Err(other) => {
                    eprintln!("error: {other:#}");
                    ExitCode::CLI_ARGS
                }
            });
        }
    };

    // A second subscriber (tests, embedding) is not an error worth stopping for.
    let _ = init_tracing(config.verbose());
    if let Some(path) = &config.config_path {
        debug!(path = %path.display(), "Loaded configuration");
    }
    for (key, (value, source)) in config.effective_config() {
        debug!(key = %key, value = %value, source = %source, "Effective configuration");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    match runtime.block_on(run_tests(&config, &root, &cwd)) {
        Ok(results) if results.has_failures() => Err(ExitCode::from_failed_count(results.failed)),
        Ok(_) => Ok(()),
        Err(err) => Err(report(&err)),
    }
}

fn report(err: &RtcheckError) -> ExitCode {
    eprintln!("{}", render_report(err));
    err.to_exit_code()
}

/// `requested` resolved against `cwd`; must be an existing directory.
fn resolve_test_root(requested: Option<&Path>, cwd: &Path) -> Result<PathBuf, RtcheckError> {
    let root = match requested {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => cwd.join(path),
        None => cwd.to_path_buf(),
    };
    if root.is_dir() {
        Ok(root)
    } else {
        Err(RtcheckError::TestRootMissing { path: root })
    }
}

async fn run_tests(config: &Config, root: &Path, cwd: &Path) -> Result<TestResults, RtcheckError> {
    println!("Testing everything under {}", root.display());

    let options = HostOptions {
        dotnet: config.runner.dotnet.clone(),
        filtered_variables: config.environment.filtered_variables.clone(),
        extra_traits: config.environment.extra_traits.clone(),
        os_release: None,
    };
    let system = detect_system(&options)
        .await
        .map_err(|e| RtcheckError::Environment {
            reason: e.to_string(),
        })?;
    println!(
        "Current platform is: {}",
        system.current_platform_ids.join(", ")
    );

    let urls = resolve_package_sources(
        &system.runtime_version,
        &config.feeds.additional,
        config.resolve_prodcon(),
    )
    .await;
    let nuget_config = nuget_config_for(&urls);

    let log_directory = config.log_directory(cwd);
    std::fs::create_dir_all(&log_directory)?;

    let mut outputs = build_outputs(config, &log_directory);

    let supervisor = ProcessSupervisor::new().with_kill_grace(config.kill_grace());
    let runner = TestRunner::new(
        Arc::new(system),
        Arc::new(HostCleaner::new()),
        Arc::new(supervisor),
    )
    .with_nuget_config(nuget_config);

    Ok(runner
        .scan_and_run(&mut outputs, root, config.default_timeout())
        .await)
}

fn build_outputs(config: &Config, log_directory: &Path) -> Vec<Box<dyn TestOutput>> {
    let console: Box<dyn TestOutput> = if config.compatible() {
        Box::new(BunnyOutput::stdout())
    } else {
        Box::new(ConsoleOutput::stdout().verbose(config.verbose()))
    };

    vec![
        console,
        Box::new(LogWriter::new(log_directory)),
        Box::new(JUnitOutput::new(log_directory.join(JUNIT_FILE_NAME))),
    ]
}
