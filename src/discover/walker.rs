//! Recursive walk over a source root using walkdir.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as produced by the walk (rooted at the configured source root).
    pub path: PathBuf,
    /// Path relative to the source root.
    pub relative_path: PathBuf,
}

/// Lazy sequence of source files under a root.
///
/// Traversal order follows the filesystem and is not stable.
pub struct SourceFiles {
    inner: Option<walkdir::IntoIter>,
    root: PathBuf,
    suffix: String,
}

impl Iterator for SourceFiles {
    type Item = SourceFile;

    fn next(&mut self) -> Option<Self::Item> {
        let walk = self.inner.as_mut()?;

        for entry in walk.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            // Stat through symlinks so linked sources count as files.
            if !entry.path().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !name.ends_with(self.suffix.as_str()) {
                continue;
            }

            let path = entry.into_path();
            let relative_path = match path.strip_prefix(&self.root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => continue,
            };

            debug!(path = %path.display(), "discovered source file");
            return Some(SourceFile {
                path,
                relative_path,
            });
        }

        None
    }
}

/// Starts a walk of `root`, yielding files whose name ends with `suffix`.
///
/// A root that does not exist produces an empty sequence rather than an
/// error.
pub fn discover_source_files(root: &Path, suffix: &str) -> SourceFiles {
    let inner = if root.is_dir() {
        Some(WalkDir::new(root).into_iter())
    } else {
        warn!(root = %root.display(), "source root not found; no files to analyze");
        None
    };

    SourceFiles {
        inner,
        root: root.to_path_buf(),
        suffix: suffix.to_string(),
    }
}
