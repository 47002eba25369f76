//! Assembly of the [`SystemUnderTest`] for a run.

use std::path::{Path, PathBuf};

use rtcheck_model::SystemUnderTest;
use tracing::{debug, info, warn};

use crate::dotnet::DotNet;
use crate::error::EnvironmentError;
use crate::platform_id::{OS_RELEASE_PATH, OsRelease};
use crate::sanitizer::EnvironmentSanitizer;
use crate::traits::{RuntimeFlavor, host_traits};

/// Inputs for probing the host.
#[derive(Debug, Clone, Default)]
pub struct HostOptions {
    pub dotnet: Option<PathBuf>,
    pub filtered_variables: Vec<String>,
    pub extra_traits: Vec<String>,
    /// Overrides `/etc/os-release`.
    pub os_release: Option<PathBuf>,
}

/// Probe the installed runtime and SDK, the platform and the environment.
pub async fn detect_system(options: &HostOptions) -> Result<SystemUnderTest, EnvironmentError> {
    let dotnet = DotNet::locate(options.dotnet.as_deref())?;
    debug!(path = %dotnet.path().display(), "Using dotnet");

    let runtime = dotnet.latest_runtime().await?;
    let sdk = dotnet.latest_sdk().await?;
    let flavor = RuntimeFlavor::detect(&runtime);
    let sdk_label = sdk
        .as_ref()
        .map_or_else(|| "none".to_string(), ToString::to_string);
    info!(
        runtime = %runtime.version,
        sdk = %sdk_label,
        flavor = flavor.as_str(),
        "Detected .NET installation"
    );

    let os_release_path = options
        .os_release
        .as_deref()
        .unwrap_or(Path::new(OS_RELEASE_PATH));
    let os_release = match OsRelease::read(os_release_path) {
        Ok(release) => Some(release),
        Err(e) => {
            warn!(error = %e, "Unable to identify the platform");
            None
        }
    };

    let platform_ids = match &os_release {
        Some(release) => release.platform_ids(),
        None => vec![std::env::consts::OS.to_string()],
    };
    let traits = host_traits(
        os_release.as_ref(),
        std::env::consts::ARCH,
        flavor,
        &options.extra_traits,
    );
    let environment =
        EnvironmentSanitizer::new(options.filtered_variables.iter().cloned()).sanitize_current();

    Ok(SystemUnderTest::new(runtime.version)
        .with_sdk(sdk)
        .with_platform_ids(platform_ids)
        .with_traits(traits)
        .with_environment(environment)
        .with_dotnet(dotnet.path()))
}
