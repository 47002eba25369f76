//! nuget.org queries and `nuget.config` generation.

use rtcheck_model::Version;
use serde::Deserialize;

use crate::client::FeedClient;
use crate::error::FeedError;

/// Package whose presence on nuget.org shows a runtime release is public.
pub const APPHOST_PACKAGE: &str = "runtime.linux-x64.Microsoft.NetCore.DotNetAppHost";

pub const AUTOCOMPLETE_URL: &str = "https://api-v2v3search-0.nuget.org/autocomplete";

/// Written when no base configuration is supplied.
pub const DEFAULT_NUGET_CONFIG: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<configuration>\n  <packageSources>\n  </packageSources>\n</configuration>";

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    data: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NuGet {
    client: FeedClient,
    autocomplete_url: String,
}

impl NuGet {
    #[must_use]
    pub fn new(client: FeedClient) -> Self {
        Self::with_endpoint(client, AUTOCOMPLETE_URL)
    }

    #[must_use]
    pub fn with_endpoint(client: FeedClient, autocomplete_url: impl Into<String>) -> Self {
        Self {
            client,
            autocomplete_url: autocomplete_url.into(),
        }
    }

    /// Whether `name` at exactly `version` is published.
    pub async fn is_package_live(&self, name: &str, version: &Version) -> Result<bool, FeedError> {
        let url = format!("{}?id={name}&prerelease=true", self.autocomplete_url);
        let body = self.client.get_text(&url).await?;
        is_package_live_in(&body, version).map_err(|reason| FeedError::InvalidResponse { url, reason })
    }
}

/// Look for `version` in an autocomplete response body. Matching is on the
/// version's exact text.
pub fn is_package_live_in(json: &str, version: &Version) -> Result<bool, String> {
    let response: AutocompleteResponse = serde_json::from_str(json).map_err(|e| e.to_string())?;
    let wanted = version.to_string();
    Ok(response.data.iter().any(|v| *v == wanted))
}

/// Insert `urls` as package sources into `base` (or
/// [`DEFAULT_NUGET_CONFIG`]). Sources are keyed by position.
#[must_use]
pub fn generate_config(urls: &[String], base: Option<&str>) -> String {
    let base = base
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(DEFAULT_NUGET_CONFIG);

    if urls.is_empty() {
        return base.to_string();
    }

    let Some(close) = base.find("</packageSources>") else {
        return base.to_string();
    };
    // Insert at the start of the closing tag's line so its indentation stays.
    let line_start = base[..close].rfind('\n').map_or(0, |i| i + 1);
    let insert_at = if base[line_start..close].trim().is_empty() {
        line_start
    } else {
        close
    };

    let sources: String = urls
        .iter()
        .enumerate()
        .map(|(i, url)| format!("    <add key=\"{i}\" value=\"{}\" />\n", escape_attribute(url)))
        .collect();

    let mut config = String::with_capacity(base.len() + sources.len());
    config.push_str(&base[..insert_at]);
    config.push_str(&sources);
    config.push_str(&base[insert_at..]);
    config
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    // ============================================================================
    // Package liveness
    // ============================================================================

    #[test]
    fn test_live_when_version_listed() {
        let json = r#"{"@context":{},"totalHits":3,"data":["2.0.0","2.1.0-preview1","2.1.0"]}"#;
        assert!(is_package_live_in(json, &version("2.1.0")).unwrap());
    }

    #[test]
    fn test_not_live_when_version_missing() {
        let json = r#"{"totalHits":1,"data":["2.0.0"]}"#;
        assert!(!is_package_live_in(json, &version("2.0.1")).unwrap());
    }

    #[test]
    fn test_comparison_is_textual() {
        let json = r#"{"data":["2.0.0"]}"#;
        assert!(!is_package_live_in(json, &version("2.0")).unwrap());
    }

    #[test]
    fn test_malformed_response() {
        assert!(is_package_live_in("{}", &version("1.0")).is_err());
        assert!(is_package_live_in("<html>", &version("1.0")).is_err());
    }

    // ============================================================================
    // Config generation
    // ============================================================================

    #[test]
    fn test_generate_with_default_base() {
        let config = generate_config(
            &["https://a.example/index.json".to_string(), "https://b.example/".to_string()],
            None,
        );

        assert_eq!(
            config,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<configuration>\n  <packageSources>\n    \
<add key=\"0\" value=\"https://a.example/index.json\" />\n    \
<add key=\"1\" value=\"https://b.example/\" />\n  \
</packageSources>\n</configuration>"
        );
    }

    #[test]
    fn test_generate_keeps_existing_sources() {
        let base = "<configuration>\n  <packageSources>\n    <clear />\n  </packageSources>\n</configuration>";
        let config = generate_config(&["https://x.example/".to_string()], Some(base));

        assert!(config.contains("<clear />\n    <add key=\"0\" value=\"https://x.example/\" />\n  </packageSources>"));
    }

    #[test]
    fn test_generate_escapes_urls() {
        let config = generate_config(&["https://x.example/?a=1&b=2".to_string()], None);
        assert!(config.contains("value=\"https://x.example/?a=1&amp;b=2\""));
    }

    #[test]
    fn test_generate_without_urls_returns_base() {
        assert_eq!(generate_config(&[], Some("   ")), DEFAULT_NUGET_CONFIG);
    }
}
