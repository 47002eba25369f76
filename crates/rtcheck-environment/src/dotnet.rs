//! Runtime and SDK discovery through the `dotnet` host.

use std::path::{Path, PathBuf};

use rtcheck_model::Version;
use rtcheck_runner::CommandSpec;
use tracing::debug;

use crate::error::EnvironmentError;

pub const SHARED_RUNTIME_NAME: &str = "Microsoft.NETCore.App";

/// One line of `dotnet --list-runtimes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: Version,
    /// Install directory of this version, `<shared>/<name>/<version>`.
    pub location: Option<PathBuf>,
}

/// Handle on a located `dotnet` executable.
#[derive(Debug, Clone)]
pub struct DotNet {
    path: PathBuf,
}

impl DotNet {
    /// Use `configured` when set, otherwise search `PATH`.
    pub fn locate(configured: Option<&Path>) -> Result<Self, EnvironmentError> {
        if let Some(path) = configured {
            if path.is_file() {
                return Ok(Self::at(path));
            }
            return Err(EnvironmentError::DotNetNotFound {
                reason: format!("configured path {} does not exist", path.display()),
            });
        }

        which::which("dotnet")
            .map(Self::at)
            .map_err(|e| EnvironmentError::DotNetNotFound {
                reason: e.to_string(),
            })
    }

    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Installed shared runtimes, `Microsoft.NETCore.App` only.
    pub async fn runtimes(&self) -> Result<Vec<RuntimeInfo>, EnvironmentError> {
        let stdout = self.capture("--list-runtimes").await?;
        Ok(parse_runtimes(&stdout))
    }

    pub async fn sdk_versions(&self) -> Result<Vec<Version>, EnvironmentError> {
        let stdout = self.capture("--list-sdks").await?;
        Ok(parse_sdks(&stdout))
    }

    /// Highest installed runtime. Having none is an error.
    pub async fn latest_runtime(&self) -> Result<RuntimeInfo, EnvironmentError> {
        self.runtimes()
            .await?
            .into_iter()
            .max_by(|a, b| a.version.cmp(&b.version))
            .ok_or(EnvironmentError::NoRuntime)
    }

    /// Highest installed SDK, `None` on runtime-only hosts.
    pub async fn latest_sdk(&self) -> Result<Option<Version>, EnvironmentError> {
        Ok(self.sdk_versions().await?.into_iter().max())
    }

    async fn capture(&self, flag: &str) -> Result<String, EnvironmentError> {
        let spec = CommandSpec::new(self.path.as_os_str()).arg(flag);
        let program = format!("{} {flag}", spec.program_display());

        let output = spec
            .to_tokio_command()
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|source| EnvironmentError::Command {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EnvironmentError::CommandFailed {
                program,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse `dotnet --list-runtimes` output:
/// `Microsoft.NETCore.App 8.0.1 [/usr/lib64/dotnet/shared/Microsoft.NETCore.App]`.
#[must_use]
pub fn parse_runtimes(stdout: &str) -> Vec<RuntimeInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            if name != SHARED_RUNTIME_NAME {
                return None;
            }
            let raw_version = columns.next()?;
            let version = parse_listed_version(raw_version)?;
            let location = bracketed(line).map(|dir| Path::new(dir).join(raw_version));
            Some(RuntimeInfo {
                name: name.to_string(),
                version,
                location,
            })
        })
        .collect()
}

/// Parse `dotnet --list-sdks` output: `8.0.101 [/usr/lib64/dotnet/sdk]`.
#[must_use]
pub fn parse_sdks(stdout: &str) -> Vec<Version> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter_map(parse_listed_version)
        .collect()
}

fn parse_listed_version(raw: &str) -> Option<Version> {
    match Version::parse(raw) {
        Ok(version) => version,
        Err(e) => {
            debug!(version = raw, error = %e, "Ignoring unparseable version in dotnet listing");
            None
        }
    }
}

fn bracketed(line: &str) -> Option<&str> {
    let start = line.find('[')?;
    let end = line.rfind(']')?;
    (end > start).then(|| &line[start + 1..end])
}
