//! Removal of state that leaks between tests: SDK caches in the home
//! directory, runtime IPC leftovers in `/tmp`, and build output inside a test
//! directory.

use std::io;
use std::path::{Path, PathBuf};

use globset::Glob;
use tracing::{debug, warn};

/// Cache locations wiped before every test. `~` expands to the home
/// directory; only the last segment may contain glob syntax.
pub const CACHE_GLOBS: &[&str] = &[
    "~/.aspnet",
    "~/.dotnet",
    "~/.local/share/NuGet",
    "~/.nuget/packages",
    "~/.templateengine",
    "/tmp/clr-debug-pipe*",
    "/tmp/CoreFxPipe*",
    "/tmp/.dotnet",
    "/tmp/.NETCore*",
    "/tmp/.NETFramework*",
    "/tmp/.NETStandard*",
    "/tmp/NuGet",
    "/tmp/NuGetScratch",
    "/tmp/Razor-Server",
    "/tmp/VBCSCompiler",
];

/// Build output removed from a test directory when its manifest asks for
/// cleanup.
pub const PROJECT_CRUFT: &[&str] = &["bin", "out", "project.lock.json"];

pub trait Cleaner: Send + Sync {
    /// Wipe shared SDK and runtime caches.
    fn clean_caches(&self);

    /// Remove build output inside `dir`.
    fn clean_project_local(&self, dir: &Path);
}

/// [`Cleaner`] acting on the real filesystem. Failures are logged and
/// otherwise ignored.
#[derive(Debug, Clone)]
pub struct HostCleaner {
    cache_globs: Vec<String>,
    project_cruft: Vec<String>,
    home: Option<PathBuf>,
}

impl Default for HostCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl HostCleaner {
    #[must_use]
    pub fn new() -> Self {
        Self::with_patterns(CACHE_GLOBS, PROJECT_CRUFT, dirs::home_dir())
    }

    #[must_use]
    pub fn with_patterns<S: AsRef<str>>(
        cache_globs: &[S],
        project_cruft: &[S],
        home: Option<PathBuf>,
    ) -> Self {
        Self {
            cache_globs: cache_globs.iter().map(|s| s.as_ref().to_string()).collect(),
            project_cruft: project_cruft.iter().map(|s| s.as_ref().to_string()).collect(),
            home,
        }
    }

    /// Existing paths matched by `pattern`.
    #[must_use]
    pub fn expand(&self, pattern: &str) -> Vec<PathBuf> {
        let Some(pattern) = self.expand_home(pattern) else {
            debug!(pattern, "No home directory; skipping cache pattern");
            return Vec::new();
        };

        let (Some(parent), Some(file_name)) = (pattern.parent(), pattern.file_name()) else {
            return Vec::new();
        };
        let file_name = file_name.to_string_lossy();

        let matcher = match Glob::new(&file_name) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                warn!(pattern = %pattern.display(), error = %e, "Invalid cache pattern");
                return Vec::new();
            }
        };

        let entries = match std::fs::read_dir(parent) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|entry| matcher.is_match(entry.file_name()))
            .map(|entry| entry.path())
            .collect();
        matches.sort();
        matches
    }

    fn expand_home(&self, pattern: &str) -> Option<PathBuf> {
        if pattern == "~" {
            return self.home.clone();
        }
        match pattern.strip_prefix("~/") {
            Some(rest) => self.home.as_ref().map(|home| home.join(rest)),
            None => Some(PathBuf::from(pattern)),
        }
    }
}

impl Cleaner for HostCleaner {
    fn clean_caches(&self) {
        for pattern in &self.cache_globs {
            for path in self.expand(pattern) {
                remove_path(&path);
            }
        }
    }

    fn clean_project_local(&self, dir: &Path) {
        for name in &self.project_cruft {
            let path = dir.join(name);
            if path.symlink_metadata().is_ok() {
                remove_path(&path);
            }
        }
    }
}

fn remove_path(path: &Path) {
    let result = match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => debug!(path = %path.display(), "Removed"),
        Err(e) => warn!(path = %path.display(), error = %e, "Unable to delete"),
    }
}
