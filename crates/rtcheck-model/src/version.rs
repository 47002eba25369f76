use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rtcheck_utils::error::VersionError;

/// A dotted version such as `8.0.1` or `9.0.0-preview.3`.
///
/// Components are kept as the original strings. Two versions compare
/// position by position after padding the shorter one with `"0"`: if both
/// components are integers they compare numerically, otherwise they compare
/// ordinally as strings. So `0.9.2 < 0.10.2`, and `1.0 == 1.0.0.0`, but
/// `0.1 != 0.0.1`.
///
/// Mixing numeric and non-numeric components in the same position does not
/// give a strict total order (`3 < 10`, `10 < 2a`, `2a < 3`). Runtime and SDK
/// version lists never contain such mixes in practice; callers that pick the
/// newest of a list use `Iterator::max`, which never panics on inconsistent
/// orderings.
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<String>,
    major: u64,
    minor: u64,
}

impl Version {
    /// Parse a dotted version.
    ///
    /// Returns `Ok(None)` for empty input. A single component gets a `0`
    /// minor appended. Fails when any component is empty (`.1`, `1..2`, `1.`)
    /// or when the major or minor component is not a non-negative integer.
    pub fn parse(input: &str) -> Result<Option<Self>, VersionError> {
        if input.is_empty() {
            return Ok(None);
        }

        let mut parts: Vec<String> = input.split('.').map(str::to_string).collect();
        if parts.iter().any(String::is_empty) {
            return Err(VersionError::EmptyComponent {
                input: input.to_string(),
            });
        }
        if parts.len() == 1 {
            parts.push("0".to_string());
        }

        let number = |component: &str| {
            component
                .parse::<u64>()
                .map_err(|_| VersionError::InvalidNumber {
                    input: input.to_string(),
                    component: component.to_string(),
                })
        };
        let major = number(&parts[0])?;
        let minor = number(&parts[1])?;

        Ok(Some(Self {
            parts,
            major,
            minor,
        }))
    }

    #[must_use]
    pub fn major(&self) -> u64 {
        self.major
    }

    #[must_use]
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// `"{major}.{minor}"` using the numeric values (`"08.1"` → `"8.1"`).
    #[must_use]
    pub fn major_minor(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    fn compare(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            let left = self.parts.get(i).map_or("0", String::as_str);
            let right = other.parts.get(i).map_or("0", String::as_str);
            let ordering = compare_component(left, right);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Components in the form equality is decided on: integers canonicalised
    /// and trailing zero positions dropped.
    fn normalized(&self) -> Vec<String> {
        let mut normalized: Vec<String> = self
            .parts
            .iter()
            .map(|part| match part.parse::<u64>() {
                Ok(n) => n.to_string(),
                Err(_) => part.clone(),
            })
            .collect();
        while normalized.last().is_some_and(|last| last == "0") {
            normalized.pop();
        }
        normalized
    }
}

fn compare_component(left: &str, right: &str) -> Ordering {
    match (left.parse::<u64>(), right.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        _ => left.cmp(right),
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)?.ok_or_else(|| VersionError::EmptyComponent {
            input: s.to_string(),
        })
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(text: &str) -> Version {
        text.parse().unwrap()
    }

    // ============================================================================
    // Parsing
    // ============================================================================

    #[test]
    fn test_parse_empty_is_absent() {
        assert_eq!(Version::parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_single_component_adds_minor() {
        let version = v("3");
        assert_eq!(version.major(), 3);
        assert_eq!(version.minor(), 0);
        assert_eq!(version.to_string(), "3.0");
    }

    #[test]
    fn test_parse_rejects_empty_components() {
        for input in [".1", "1..2", "1.", "."] {
            assert!(
                matches!(
                    Version::parse(input),
                    Err(VersionError::EmptyComponent { .. })
                ),
                "{input} should fail"
            );
        }
    }

    #[test]
    fn test_parse_rejects_non_numeric_major_minor() {
        assert!(matches!(
            Version::parse("x.1"),
            Err(VersionError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Version::parse("2.x"),
            Err(VersionError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_prerelease_patch_is_accepted() {
        let version = v("9.0.0-preview.3");
        assert_eq!(version.major_minor(), "9.0");
        assert_eq!(version.to_string(), "9.0.0-preview.3");
    }

    #[test]
    fn test_display_is_verbatim() {
        assert_eq!(v("1.02.003").to_string(), "1.02.003");
        assert_eq!(v("1.02.003").major_minor(), "1.2");
    }

    // ============================================================================
    // Comparison
    // ============================================================================

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("1.0"), v("1.0.0.0"));
        assert_eq!(v("1"), v("1.0.0"));
    }

    #[test]
    fn test_inserted_zero_is_not_equal() {
        assert_ne!(v("0.1"), v("0.0.1"));
        assert!(v("0.0.1") < v("0.1"));
    }

    #[test]
    fn test_numeric_component_comparison() {
        assert!(v("0.9.2") < v("0.10.2"));
        assert!(v("2.1") > v("2.0.9"));
        assert!(v("3.0") >= v("2.1"));
        assert!(v("2.1.1") >= v("2.1"));
    }

    #[test]
    fn test_non_numeric_component_falls_back_to_ordinal() {
        assert!(v("1.0.0-preview") < v("1.0.0-rc"));
        assert!(v("1.0.a") > v("1.0.0"));
    }

    #[test]
    fn test_leading_zero_components_compare_numerically() {
        assert_eq!(v("1.01"), v("1.1"));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("1.0"));
        assert!(set.contains(&v("1.0.0.0")));
        assert!(set.contains(&v("01.00")));
        assert!(!set.contains(&v("1.0.1")));
    }

    #[test]
    fn test_max_picks_latest() {
        let versions = [v("6.0.25"), v("8.0.1"), v("7.0.14"), v("8.0.0")];
        assert_eq!(versions.iter().max().unwrap(), &v("8.0.1"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("8.0.1")).unwrap();
        assert_eq!(json, "\"8.0.1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("8.0.1"));
        assert!(serde_json::from_str::<Version>("\".1\"").is_err());
    }

    // ============================================================================
    // Property tests
    // ============================================================================

    fn numeric_version() -> impl Strategy<Value = Version> {
        prop::collection::vec(0u64..50, 2..5).prop_map(|parts| {
            let text = parts
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(".");
            text.parse().unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_comparison_is_antisymmetric(a in numeric_version(), b in numeric_version()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn prop_comparison_is_transitive(
            a in numeric_version(),
            b in numeric_version(),
            c in numeric_version(),
        ) {
            if a <= b && b <= c {
                prop_assert!(a <= c);
            }
        }

        #[test]
        fn prop_appending_zero_preserves_equality(a in numeric_version()) {
            let padded: Version = format!("{a}.0").parse().unwrap();
            prop_assert_eq!(&a, &padded);
        }
    }
}
