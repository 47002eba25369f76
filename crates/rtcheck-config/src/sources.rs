use std::collections::BTreeMap;

use rtcheck_utils::types::ConfigSource;

use crate::Config;

impl Config {
    /// Effective configuration as `key -> (value, source)`, for verbose
    /// startup output.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let source = self
                    .source_attribution
                    .get(key)
                    .copied()
                    .unwrap_or(ConfigSource::Default);
                config.insert(key.to_string(), (value, source.as_str().to_string()));
            }
        };

        add("timeout_secs", self.defaults.timeout_secs.map(|t| t.to_string()));
        add("verbose", self.defaults.verbose.map(|v| v.to_string()));
        add("compatible", self.defaults.compatible.map(|c| c.to_string()));
        add(
            "log_directory",
            self.defaults
                .log_directory
                .as_ref()
                .map(|p| p.display().to_string()),
        );
        add(
            "feeds_additional",
            (!self.feeds.additional.is_empty()).then(|| self.feeds.additional.join(", ")),
        );
        add("resolve_prodcon", Some(self.resolve_prodcon().to_string()));
        add(
            "filtered_variables",
            (!self.environment.filtered_variables.is_empty())
                .then(|| self.environment.filtered_variables.join(", ")),
        );
        add(
            "extra_traits",
            (!self.environment.extra_traits.is_empty())
                .then(|| self.environment.extra_traits.join(", ")),
        );
        add("kill_grace_ms", self.runner.kill_grace_ms.map(|g| g.to_string()));
        add(
            "dotnet",
            self.runner.dotnet.as_ref().map(|p| p.display().to_string()),
        );

        config
    }
}
