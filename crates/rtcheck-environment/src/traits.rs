//! Host traits matched by `skipWhen` conditions.

use std::collections::BTreeSet;
use std::path::Path;

use crate::dotnet::RuntimeInfo;
use crate::platform_id::OsRelease;

/// Libraries whose presence in a runtime directory marks a Mono build.
const MONO_MARKERS: &[&str] = &["libmonosgen-2.0.so", "libmonosgen-2.0.dylib", "monosgen-2.0.dll"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFlavor {
    CoreClr,
    Mono,
}

impl RuntimeFlavor {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoreClr => "coreclr",
            Self::Mono => "mono",
        }
    }

    /// Inspect the install directory of `runtime`.
    #[must_use]
    pub fn detect(runtime: &RuntimeInfo) -> Self {
        match runtime.location.as_deref() {
            Some(dir) if is_mono_runtime_dir(dir) => Self::Mono,
            _ => Self::CoreClr,
        }
    }
}

fn is_mono_runtime_dir(dir: &Path) -> bool {
    MONO_MARKERS.iter().any(|marker| dir.join(marker).is_file())
}

/// Architecture name as .NET spells it.
#[must_use]
pub fn dotnet_arch(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64le",
        other => other,
    }
}

/// Build the trait set: `os=<id>`, `os=<id><version>`, `arch=<arch>`,
/// `runtime=<flavor>`, then `extra` verbatim.
#[must_use]
pub fn host_traits(
    os: Option<&OsRelease>,
    arch: &str,
    flavor: RuntimeFlavor,
    extra: &[String],
) -> BTreeSet<String> {
    let mut traits = BTreeSet::new();

    if let Some(os) = os {
        traits.insert(format!("os={}", os.id));
        if !os.version_id.is_empty() {
            traits.insert(format!("os={}{}", os.id, os.version_id));
        }
    }
    traits.insert(format!("arch={}", dotnet_arch(arch)));
    traits.insert(format!("runtime={}", flavor.as_str()));
    traits.extend(extra.iter().cloned());

    traits
}
