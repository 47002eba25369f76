//! Test selection for rtcheck.
//!
//! [`TestSelector`] decides whether a [`TestDescriptor`] applies to a
//! [`SystemUnderTest`]. The checks run in a fixed order and the first failing
//! one wins:
//!
//! 1. the manifest is enabled
//! 2. the runtime version matches (minimum threshold, or exact `Major.Minor` /
//!    `Major.x` pattern for version-specific tests)
//! 3. an SDK is installed when one is required
//! 4. no current platform id is listed in `ignoredRIDs`
//! 5. no `skipWhen` condition matches the system traits
//!
//! A `skipWhen` condition is a comma-separated list of traits; it matches when
//! every listed trait is present. Any matching condition disables the test.

use std::collections::BTreeSet;
use std::fmt;

use rtcheck_model::{SystemUnderTest, TestDescriptor, Version};
use tracing::debug;

/// Why a test is not going to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSkip {
    Disabled,
    VersionMismatch { required: String, runtime: String },
    SdkRequired,
    IgnoredPlatform { rid: String },
    SkipWhenMatched { condition: String },
}

impl fmt::Display for SelectionSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "test is disabled"),
            Self::VersionMismatch { required, runtime } => {
                write!(f, "runtime {runtime} does not satisfy version {required}")
            }
            Self::SdkRequired => write!(f, "test requires an SDK"),
            Self::IgnoredPlatform { rid } => write!(f, "platform '{rid}' is ignored"),
            Self::SkipWhenMatched { condition } => {
                write!(f, "skipWhen condition '{condition}' matched")
            }
        }
    }
}

/// Stateless selection predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestSelector;

impl TestSelector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn should_run(&self, system: &SystemUnderTest, descriptor: &TestDescriptor) -> bool {
        self.evaluate(system, descriptor).is_none()
    }

    /// First failing gate, or `None` when the test should run.
    #[must_use]
    pub fn evaluate(
        &self,
        system: &SystemUnderTest,
        descriptor: &TestDescriptor,
    ) -> Option<SelectionSkip> {
        if !descriptor.enabled {
            return Some(SelectionSkip::Disabled);
        }

        if !version_matches(descriptor, &system.runtime_version) {
            return Some(SelectionSkip::VersionMismatch {
                required: descriptor.version.clone(),
                runtime: system.runtime_version.to_string(),
            });
        }

        if descriptor.requires_sdk && system.sdk_version.is_none() {
            return Some(SelectionSkip::SdkRequired);
        }

        if let Some(rid) = system
            .current_platform_ids
            .iter()
            .find(|rid| descriptor.ignored_rids.contains(rid))
        {
            return Some(SelectionSkip::IgnoredPlatform { rid: rid.clone() });
        }

        if let Some(condition) = descriptor
            .skip_when
            .iter()
            .find(|condition| condition_matches(condition, &system.traits))
        {
            return Some(SelectionSkip::SkipWhenMatched {
                condition: condition.clone(),
            });
        }

        None
    }
}

fn version_matches(descriptor: &TestDescriptor, runtime: &Version) -> bool {
    if descriptor.version_specific {
        let wildcard = format!("{}.x", runtime.major());
        return descriptor.version == wildcard || descriptor.version == runtime.major_minor();
    }

    match Version::parse(&descriptor.version) {
        Ok(Some(threshold)) => *runtime >= threshold,
        Ok(None) => {
            debug!(test = %descriptor.name, "empty version threshold; test disabled");
            false
        }
        Err(err) => {
            debug!(test = %descriptor.name, error = %err, "unparseable version threshold; test disabled");
            false
        }
    }
}

/// A condition matches when every non-empty comma-separated trait is present.
///
/// A condition with no traits at all (`""`, `" , "`) never matches.
fn condition_matches(condition: &str, traits: &BTreeSet<String>) -> bool {
    let mut required = condition
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .peekable();

    if required.peek().is_none() {
        return false;
    }
    required.all(|t| traits.contains(t))
}
