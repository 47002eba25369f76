//! Test execution engine for rtcheck.
//!
//! [`TestRunner`] finds `test.json` manifests under a root, turns each into a
//! [`Test`] through [`TestParser`], runs it with the [`ExecutionStrategy`] for
//! its kind and reports every step to the registered [`TestOutput`]s.

pub mod launcher;
pub mod log;
pub mod output;
pub mod parser;
pub mod patcher;
pub mod runner;
pub mod strategy;
pub mod test;

pub use launcher::{Cancelled, Launcher};
pub use log::{LogStream, TIMEOUT_MARKER, TestLog};
pub use output::TestOutput;
pub use parser::{MANIFEST_FILE, TestParser};
pub use runner::TestRunner;
pub use strategy::{BuildAndTestStrategy, ExecutionStrategy, SHELL_ENTRY_POINT, ShellStrategy};
pub use test::{NUGET_CONFIG_FILE, NuGetConfigGuard, Test};
