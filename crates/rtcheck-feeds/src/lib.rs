//! Package feeds for tests that restore packages.
//!
//! Tests run against runtimes that may not be published on nuget.org yet.
//! When that is the case the ProdCon feed of the matching source-build branch
//! is added as a package source, next to any feeds the user configured, and a
//! `nuget.config` listing them is written into each test directory.

pub mod client;
pub mod error;
pub mod nuget;
pub mod source_build;

pub use client::FeedClient;
pub use error::FeedError;
pub use nuget::{APPHOST_PACKAGE, DEFAULT_NUGET_CONFIG, NuGet, generate_config, is_package_live_in};
pub use source_build::SourceBuild;

use rtcheck_model::Version;
use tracing::{info, warn};

/// Package sources for a run: `additional` first, then the ProdCon feed when
/// `resolve_prodcon` is set and the runtime's packages are not live. Lookup
/// failures are logged and leave the list as is.
pub async fn resolve_package_sources(
    runtime_version: &Version,
    additional: &[String],
    resolve_prodcon: bool,
) -> Vec<String> {
    let mut urls = additional.to_vec();
    if !resolve_prodcon {
        return urls;
    }

    match prodcon_feed_if_needed(runtime_version).await {
        Ok(Some(feed)) => {
            info!("Packages are not live on nuget.org; using {feed} as additional package source");
            urls.push(feed);
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to get ProdCon url; continuing without it"),
    }

    urls
}

async fn prodcon_feed_if_needed(version: &Version) -> Result<Option<String>, FeedError> {
    let client = FeedClient::new()?;
    if NuGet::new(client.clone()).is_package_live(APPHOST_PACKAGE, version).await? {
        return Ok(None);
    }
    SourceBuild::new(client).prodcon_feed(version).await
}

/// The `nuget.config` to place in test directories, `None` when there are no
/// extra sources.
#[must_use]
pub fn nuget_config_for(urls: &[String]) -> Option<String> {
    (!urls.is_empty()).then(|| generate_config(urls, None))
}
