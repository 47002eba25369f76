use std::collections::{BTreeMap, BTreeSet};

/// Variables that are never passed on to tests.
pub const DEFAULT_FILTERED_VARIABLES: &[&str] = &["OPENSSL_CONF"];

/// Removes variables that would make tests behave differently from a clean
/// host.
#[derive(Debug, Clone)]
pub struct EnvironmentSanitizer {
    filtered: BTreeSet<String>,
}

impl Default for EnvironmentSanitizer {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl EnvironmentSanitizer {
    /// The built-in filter list plus `extra` names.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filtered = DEFAULT_FILTERED_VARIABLES
            .iter()
            .map(|s| (*s).to_string())
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self { filtered }
    }

    #[must_use]
    pub fn is_filtered(&self, name: &str) -> bool {
        self.filtered.contains(name)
    }

    pub fn sanitize<I, K, V>(&self, variables: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !self.is_filtered(k))
            .collect()
    }

    /// Sanitized copy of this process's environment. Variables whose name or
    /// value is not valid Unicode are dropped.
    #[must_use]
    pub fn sanitize_current(&self) -> BTreeMap<String, String> {
        self.sanitize(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }
}
