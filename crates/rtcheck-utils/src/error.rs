//! Error types for rtcheck
//!
//! Every expected failure of a test run (non-zero exit, missing entry point,
//! timeout) is encoded in a `TestResult`, not here. These types cover the
//! conditions that stop a component from doing its job at all: a bad
//! configuration, a manifest that cannot be read, a malformed version string.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Top-level error type for the rtcheck library.
///
/// Library code returns `RtcheckError` and does NOT call `std::process::exit()`.
/// The CLI maps it to an [`ExitCode`] with [`RtcheckError::to_exit_code`].
#[derive(Error, Debug)]
pub enum RtcheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Test root '{}' does not exist", path.display())]
    TestRootMissing { path: PathBuf },

    #[error("Environment detection failed: {reason}")]
    Environment { reason: String },
}

impl RtcheckError {
    /// Map the error to the process exit code used by the CLI.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::TestRootMissing { .. } => ExitCode::CLI_ARGS,
            Self::Environment { .. } => ExitCode::ENVIRONMENT,
            Self::Manifest(_) | Self::Version(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

/// Malformed dotted version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version '{input}' contains an empty component")]
    EmptyComponent { input: String },

    #[error("Version '{input}' has a non-numeric component '{component}'")]
    InvalidNumber { input: String, component: String },
}

/// A `test.json` manifest that cannot be turned into a test.
///
/// These are logged and the manifest is excluded from the run totals.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest {} has an invalid '{field}': {reason}", path.display())]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },

    #[error("Manifest {} has no parent directory", path.display())]
    NoDirectory { path: PathBuf },
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Manifest,
    Environment,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Manifest => write!(f, "Manifest"),
            Self::Environment => write!(f, "Environment"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
            Self::ValidationFailed { errors, .. } => {
                format!(
                    "Configuration validation failed with {} errors: {}",
                    errors.len(),
                    errors.join(", ")
                )
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional [defaults], [feeds], [environment] and [runner] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } => {
                Some("An explicit --config path was given but nothing exists there.".to_string())
            }
            Self::DiscoveryFailed { .. } | Self::ValidationFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .rtcheck/config.toml".to_string(),
                "Remove unknown sections or keys".to_string(),
            ],
            Self::InvalidValue { key, .. } => {
                vec![format!("Fix or remove the '{key}' setting")]
            }
            Self::NotFound { path } => vec![
                format!("Create the configuration file at {path}"),
                "Omit --config to use discovery and built-in defaults".to_string(),
            ],
            Self::DiscoveryFailed { .. } => {
                vec!["Pass an explicit configuration file with --config".to_string()]
            }
            Self::ValidationFailed { errors, .. } => errors
                .iter()
                .map(|e| format!("Fix: {e}"))
                .collect(),
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for RtcheckError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            other => other.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::TestRootMissing { .. } => {
                Some("The test root is searched recursively for test.json manifests.".to_string())
            }
            Self::Environment { .. } => Some(
                "rtcheck needs a working 'dotnet' installation to determine the runtime under test."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::TestRootMissing { .. } => {
                vec!["Pass an existing directory as the test root".to_string()]
            }
            Self::Environment { .. } => vec![
                "Make sure 'dotnet' is on PATH or set [runner].dotnet in the config".to_string(),
                "Run 'dotnet --list-runtimes' to verify the installation".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Manifest(_) | Self::Version(_) => ErrorCategory::Manifest,
            Self::Io(_) | Self::TestRootMissing { .. } => ErrorCategory::FileSystem,
            Self::Environment { .. } => ErrorCategory::Environment,
        }
    }
}

/// Render an error with its context and suggestions for terminal output.
#[must_use]
pub fn render_report(err: &dyn UserFriendlyError) -> String {
    let mut out = format!("error[{}]: {}", err.category(), err.user_message());
    if let Some(context) = err.context() {
        out.push_str("\n  note: ");
        out.push_str(&context);
    }
    for suggestion in err.suggestions() {
        out.push_str("\n  help: ");
        out.push_str(&suggestion);
    }
    out
}
