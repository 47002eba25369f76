use std::path::PathBuf;
use thiserror::Error;

/// Failures while probing the host.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("'dotnet' not found: {reason}")]
    DotNetNotFound { reason: String },

    #[error("Failed to run {program}: {source}")]
    Command {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("No Microsoft.NETCore.App runtime is installed")]
    NoRuntime,

    #[error("Failed to read {}: {source}", path.display())]
    OsRelease {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("os-release data has no {key} entry")]
    OsReleaseKey { key: &'static str },
}
