//! Data model shared by the rtcheck selection and execution engine.
//!
//! - [`Version`]: dotted version with mixed numeric/ordinal comparison
//! - [`TestDescriptor`]: the deserialized `test.json` manifest
//! - [`SystemUnderTest`]: the runtime/SDK/platform snapshot a run targets
//! - [`TestResult`] / [`TestResults`]: per-test outcome and run totals

mod descriptor;
mod result;
mod system;
mod version;

pub use descriptor::{ExecutionKind, TestDescriptor};
pub use result::{TestResult, TestResults};
pub use system::SystemUnderTest;
pub use version::Version;
pub use rtcheck_utils::error::VersionError;
