//! rtcheck - compatibility test runner for installed .NET runtimes and SDKs
//!
//! rtcheck walks a directory tree for `test.json` manifests, decides which
//! tests apply to the runtime, SDK and platform at hand, runs each one under a
//! timeout (killing its whole process tree when the timeout fires) and
//! reports pass/fail/skip results on the console, as JUnit XML and as per-test
//! log files.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run every test under the current directory
//! rtcheck
//!
//! # Run a test tree with a 10 minute default timeout and bunny-style output
//! rtcheck ./tests --timeout 600 --compatible
//! ```
//!
//! # Library
//!
//! The workspace crates are re-exported here so the engine can be embedded:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rtcheck::{HostCleaner, ProcessSupervisor, SystemUnderTest, TestRunner, Version};
//!
//! # async fn demo() {
//! let runtime: Version = "8.0.1".parse().unwrap();
//! let runner = TestRunner::new(
//!     Arc::new(SystemUnderTest::new(runtime)),
//!     Arc::new(HostCleaner::new()),
//!     Arc::new(ProcessSupervisor::new()),
//! );
//! let results = runner
//!     .scan_and_run(&mut [], std::path::Path::new("tests"), Duration::from_secs(300))
//!     .await;
//! println!("{} failed", results.failed);
//! # }
//! ```

pub mod cli;

pub use rtcheck_config::{CliArgs, Config, ConfigSource};
pub use rtcheck_engine::{
    Cancelled, Launcher, Test, TestLog, TestOutput, TestParser, TestRunner, TIMEOUT_MARKER,
};
pub use rtcheck_environment::{Cleaner, DotNet, EnvironmentSanitizer, HostCleaner, OsRelease};
pub use rtcheck_model::{
    ExecutionKind, SystemUnderTest, TestDescriptor, TestResult, TestResults, Version,
};
pub use rtcheck_report::{BunnyOutput, ConsoleOutput, JUnitOutput, LogWriter};
pub use rtcheck_runner::{
    CancellationSource, CancellationToken, CommandSpec, OutputSinks, ProcessSupervisor,
    SupervisorError,
};
pub use rtcheck_selectors::{SelectionSkip, TestSelector};
pub use rtcheck_utils::error::{ConfigError, ManifestError, RtcheckError, VersionError};
pub use rtcheck_utils::exit_codes::ExitCode;
