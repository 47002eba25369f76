use rtcheck_utils::error::{ConfigError, RtcheckError};

use crate::Config;

const MAX_TIMEOUT_SECS: u64 = 86_400;
const MAX_KILL_GRACE_MS: u64 = 60_000;

impl Config {
    /// Validate configuration values, reporting every problem at once.
    pub(crate) fn validate(&self) -> Result<(), RtcheckError> {
        let mut errors = Vec::new();

        if let Some(timeout) = self.defaults.timeout_secs
            && timeout > MAX_TIMEOUT_SECS
        {
            errors.push(format!(
                "timeout_secs = {timeout} exceeds maximum limit of {MAX_TIMEOUT_SECS} seconds (24 hours)"
            ));
        }

        if let Some(grace) = self.runner.kill_grace_ms
            && grace > MAX_KILL_GRACE_MS
        {
            errors.push(format!(
                "kill_grace_ms = {grace} exceeds maximum limit of {MAX_KILL_GRACE_MS} ms"
            ));
        }

        for feed in &self.feeds.additional {
            if !is_http_url(feed) {
                errors.push(format!("feed '{feed}' is not an http(s) URL"));
            }
        }

        for name in &self.environment.filtered_variables {
            if name.is_empty() || name.contains('=') {
                errors.push(format!("filtered variable '{name}' is not a valid name"));
            }
        }

        for t in &self.environment.extra_traits {
            if t.trim().is_empty() || t.contains(',') {
                errors.push(format!(
                    "trait '{t}' must be non-empty and must not contain ','"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            let error_count = errors.len();
            Err(RtcheckError::Config(ConfigError::ValidationFailed {
                errors,
                error_count,
            }))
        }
    }
}

fn is_http_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            && value.len() > scheme.len()
    })
}
