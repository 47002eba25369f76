//! Host probing for rtcheck: which runtime and SDK are installed, what
//! platform this is, which traits apply, which environment tests inherit,
//! and cleanup of caches between tests.

pub mod cleaner;
pub mod dotnet;
pub mod error;
pub mod host;
pub mod platform_id;
pub mod sanitizer;
pub mod traits;

pub use cleaner::{CACHE_GLOBS, Cleaner, HostCleaner, PROJECT_CRUFT};
pub use dotnet::{DotNet, RuntimeInfo};
pub use error::EnvironmentError;
pub use host::{HostOptions, detect_system};
pub use platform_id::OsRelease;
pub use sanitizer::{DEFAULT_FILTERED_VARIABLES, EnvironmentSanitizer};
pub use traits::{RuntimeFlavor, host_traits};
