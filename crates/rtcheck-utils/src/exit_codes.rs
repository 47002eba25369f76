//! Exit code constants for rtcheck.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Every executed test passed (skips allowed) |
//! | 1 | `TEST_FAILURES` | At least one test failed |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments, configuration, or test root |
//! | 3 | `ENVIRONMENT` | The runtime under test could not be determined |
//! | 70 | `INTERNAL` | Unexpected internal failure |

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the CLI contract: CI scripts rely on
/// `0` meaning "no failed tests".
///
/// ```rust
/// use rtcheck_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_failed_count(3), ExitCode::TEST_FAILURES);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// No test failed
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// One or more tests failed
    pub const TEST_FAILURES: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, configuration or test root
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Environment error - runtime/SDK detection failed
    pub const ENVIRONMENT: ExitCode = ExitCode(3);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Exit code for a completed run: nonzero iff any test failed.
    #[must_use]
    pub const fn from_failed_count(failed: usize) -> Self {
        if failed == 0 {
            Self::SUCCESS
        } else {
            Self::TEST_FAILURES
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
