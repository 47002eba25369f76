//! Retargets a test's project file at the runtime under test.

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use rtcheck_model::Version;

static TARGET_FRAMEWORK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<TargetFramework>net(?:coreapp)?\d+\.\d+</TargetFramework>")
        .expect("TargetFramework pattern is valid")
});

/// Target framework moniker for `runtime`: `netcoreappX.Y` below 4, `netX.Y`
/// otherwise.
#[must_use]
pub fn target_framework(runtime: &Version) -> String {
    if runtime.major() < 4 {
        format!("netcoreapp{}", runtime.major_minor())
    } else {
        format!("net{}", runtime.major_minor())
    }
}

/// `contents` with every `<TargetFramework>` pointing at `runtime`, or
/// `None` when nothing changed.
#[must_use]
pub fn retarget(contents: &str, runtime: &Version) -> Option<String> {
    let replacement = format!("<TargetFramework>{}</TargetFramework>", target_framework(runtime));
    let patched = TARGET_FRAMEWORK.replace_all(contents, replacement.as_str());
    (patched != contents).then(|| patched.into_owned())
}

/// Patch `<dir-name>.csproj` inside `dir` if it exists. Returns the patched
/// path when the file changed.
pub fn patch_project(dir: &Path, runtime: &Version) -> io::Result<Option<PathBuf>> {
    let Some(dir_name) = dir.file_name() else {
        return Ok(None);
    };
    let mut file_name = dir_name.to_os_string();
    file_name.push(".csproj");
    let csproj = dir.join(file_name);

    if !csproj.is_file() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&csproj)?;
    match retarget(&contents, runtime) {
        Some(patched) => {
            std::fs::write(&csproj, patched)?;
            Ok(Some(csproj))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_target_framework_naming() {
        assert_eq!(target_framework(&version("3.1.32")), "netcoreapp3.1");
        assert_eq!(target_framework(&version("8.0.1")), "net8.0");
        assert_eq!(target_framework(&version("10.0.0")), "net10.0");
    }

    #[test]
    fn test_retarget_rewrites_either_spelling() {
        let old = "<PropertyGroup>\n  <TargetFramework>netcoreapp2.1</TargetFramework>\n</PropertyGroup>";
        assert_eq!(
            retarget(old, &version("8.0")).unwrap(),
            "<PropertyGroup>\n  <TargetFramework>net8.0</TargetFramework>\n</PropertyGroup>"
        );

        let newer = "<TargetFramework>net6.0</TargetFramework>";
        assert_eq!(
            retarget(newer, &version("3.1")).unwrap(),
            "<TargetFramework>netcoreapp3.1</TargetFramework>"
        );
    }

    #[test]
    fn test_retarget_leaves_other_content() {
        assert!(retarget("<TargetFrameworks>net6.0;net8.0</TargetFrameworks>", &version("8.0")).is_none());
        assert!(retarget("<TargetFramework>net8.0</TargetFramework>", &version("8.0")).is_none());
    }

    #[test]
    fn test_patch_project_uses_directory_name() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("hello-world");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("other.csproj"), "<TargetFramework>net6.0</TargetFramework>").unwrap();

        assert_eq!(patch_project(&dir, &version("8.0")).unwrap(), None);

        let csproj = dir.join("hello-world.csproj");
        std::fs::write(&csproj, "<TargetFramework>net6.0</TargetFramework>").unwrap();

        assert_eq!(patch_project(&dir, &version("8.0")).unwrap(), Some(csproj.clone()));
        assert_eq!(
            std::fs::read_to_string(&csproj).unwrap(),
            "<TargetFramework>net8.0</TargetFramework>"
        );
        assert_eq!(
            std::fs::read_to_string(dir.join("other.csproj")).unwrap(),
            "<TargetFramework>net6.0</TargetFramework>"
        );
    }
}
