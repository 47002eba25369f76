//! ProdCon feed lookup through the source-build repository.

use rtcheck_model::Version;
use tracing::debug;

use crate::client::FeedClient;
use crate::error::FeedError;

pub const SOURCE_BUILD_RAW_URL: &str = "https://raw.githubusercontent.com/dotnet/source-build";

#[derive(Debug, Clone)]
pub struct SourceBuild {
    client: FeedClient,
    base_url: String,
}

impl SourceBuild {
    #[must_use]
    pub fn new(client: FeedClient) -> Self {
        Self::with_base_url(client, SOURCE_BUILD_RAW_URL)
    }

    #[must_use]
    pub fn with_base_url(client: FeedClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// URL of `ProdConFeed.txt` on the release branch for `version`.
    #[must_use]
    pub fn prodcon_pointer_url(&self, version: &Version) -> String {
        format!(
            "{}/branch/{}/ProdConFeed.txt",
            self.base_url.trim_end_matches('/'),
            version.major_minor()
        )
    }

    /// The ProdCon feed for `version`, or `None` when the branch publishes no
    /// feed or the feed it names is unreachable.
    pub async fn prodcon_feed(&self, version: &Version) -> Result<Option<String>, FeedError> {
        let pointer = self.prodcon_pointer_url(version);
        let feed = match self.client.get_text(&pointer).await {
            Ok(text) => text.trim().to_string(),
            Err(FeedError::Status { status, .. }) => {
                debug!(url = %pointer, status, "No ProdCon feed published");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if feed.is_empty() {
            return Ok(None);
        }
        if !self.client.is_reachable(&feed).await? {
            debug!(url = %feed, "ProdCon feed is not reachable");
            return Ok(None);
        }
        Ok(Some(feed))
    }
}
