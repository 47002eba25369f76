//! Platform identifiers from `/etc/os-release`.

use std::path::Path;

use crate::error::EnvironmentError;

pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// The `ID` and `VERSION_ID` entries of an os-release file, unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub version_id: String,
}

impl OsRelease {
    /// Parse os-release contents. When a key appears more than once the last
    /// value wins. A missing `VERSION_ID` (rolling releases) is empty.
    pub fn parse(contents: &str) -> Result<Self, EnvironmentError> {
        let id = value_of("ID", contents).ok_or(EnvironmentError::OsReleaseKey { key: "ID" })?;
        let mut version_id = value_of("VERSION_ID", contents).unwrap_or_default();

        if id == "rhel"
            && let Some(dot) = version_id.find('.')
            && dot > 0
        {
            version_id.truncate(dot);
        }

        Ok(Self { id, version_id })
    }

    pub fn read(path: &Path) -> Result<Self, EnvironmentError> {
        let contents = std::fs::read_to_string(path).map_err(|source| EnvironmentError::OsRelease {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// `["linux", id, id+version]`, most general first. The versioned id is
    /// omitted when there is no version.
    #[must_use]
    pub fn platform_ids(&self) -> Vec<String> {
        let mut ids = vec!["linux".to_string(), self.id.clone()];
        if !self.version_id.is_empty() {
            ids.push(format!("{}{}", self.id, self.version_id));
        }
        ids
    }
}

fn value_of(key: &str, contents: &str) -> Option<String> {
    contents
        .lines()
        .filter_map(|line| line.strip_prefix(key)?.strip_prefix('='))
        .last()
        .map(|value| unquote(value.trim_end()).to_string())
}

/// Strip one pair of matching double or single quotes. Escapes inside the
/// value are not interpreted.
fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
