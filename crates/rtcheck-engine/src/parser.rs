use std::path::Path;
use std::sync::Arc;

use rtcheck_model::{SystemUnderTest, TestDescriptor};
use rtcheck_selectors::TestSelector;
use rtcheck_utils::error::ManifestError;
use tracing::warn;

use crate::test::Test;

/// File name of a test manifest.
pub const MANIFEST_FILE: &str = "test.json";

/// Turns `test.json` manifests into [`Test`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestParser {
    selector: TestSelector,
}

impl TestParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(
        &self,
        system: Arc<SystemUnderTest>,
        manifest: &Path,
        nuget_config: Option<&str>,
    ) -> Result<Test, ManifestError> {
        let directory = manifest
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .ok_or_else(|| ManifestError::NoDirectory {
                path: manifest.to_path_buf(),
            })?;

        let descriptor = Self::read_descriptor(manifest)?;

        let dir_name = directory.file_name().map(|n| n.to_string_lossy());
        if dir_name.as_deref() != Some(descriptor.name.as_str()) {
            warn!(
                directory = %directory.display(),
                name = %descriptor.name,
                "mismatch in directory name vs test name"
            );
        }

        let skip = self.selector.evaluate(&system, &descriptor);
        Ok(Test::new(
            directory,
            system,
            nuget_config.map(String::from),
            descriptor,
            skip,
        ))
    }

    /// Read and validate a manifest without binding it to a system.
    pub fn read_descriptor(manifest: &Path) -> Result<TestDescriptor, ManifestError> {
        let contents = std::fs::read_to_string(manifest).map_err(|source| ManifestError::Read {
            path: manifest.to_path_buf(),
            source,
        })?;

        let descriptor: TestDescriptor =
            serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
                path: manifest.to_path_buf(),
                source,
            })?;

        if !descriptor.timeout_multiplier.is_finite() || descriptor.timeout_multiplier < 0.0 {
            return Err(ManifestError::InvalidField {
                path: manifest.to_path_buf(),
                field: "timeoutMultiplier",
                reason: format!(
                    "{} is not a non-negative number",
                    descriptor.timeout_multiplier
                ),
            });
        }

        Ok(descriptor)
    }
}
