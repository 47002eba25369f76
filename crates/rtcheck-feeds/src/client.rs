//! Shared HTTP client for feed queries.

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::debug;

use crate::error::FeedError;

/// Overall limit for a single feed request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("rtcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET `url`, failing on any non-success status.
    pub async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(|source| FeedError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// GET `url` and report only whether the status was a success.
    pub async fn is_reachable(&self, url: &str) -> Result<bool, FeedError> {
        Ok(self.get(url).await?.status().is_success())
    }

    async fn get(&self, url: &str) -> Result<Response, FeedError> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| FeedError::Http {
                url: url.to_string(),
                source,
            })
    }
}
