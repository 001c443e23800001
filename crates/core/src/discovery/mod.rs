//! Work discovery: walks a scan root and yields the documents to process.
//!
//! Discovery is lazy. `WorkDiscoverer::discover` validates the root up
//! front and returns an iterator that walks the tree as it is consumed, so a
//! large archive is never listed into memory before processing starts.
//! Calling `discover` again starts a fresh walk.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

use crate::processor::WorkItem;

/// Errors that prevent discovery from starting.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("scan root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("scan root is not readable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Finds files under a root whose name ends with a configured suffix.
#[derive(Debug, Clone)]
pub struct WorkDiscoverer {
    extension: String,
}

impl Default for WorkDiscoverer {
    fn default() -> Self {
        Self::new(".pdf")
    }
}

impl WorkDiscoverer {
    /// Creates a discoverer matching names that end with `extension`.
    ///
    /// The match is a case-sensitive suffix check on the file name.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Validates `root` and returns a lazy sequence of matching files.
    ///
    /// Entries that cannot be read while walking are logged and skipped.
    pub fn discover(
        &self,
        root: &Path,
    ) -> Result<impl Iterator<Item = WorkItem> + Send + 'static, DiscoveryError> {
        let root = std::path::absolute(root).map_err(|source| DiscoveryError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let metadata = match std::fs::metadata(&root) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DiscoveryError::RootNotFound(root));
            }
            Err(source) => return Err(DiscoveryError::Unreadable { path: root, source }),
        };
        if !metadata.is_dir() {
            return Err(DiscoveryError::NotADirectory(root));
        }
        if let Err(source) = std::fs::read_dir(&root) {
            return Err(DiscoveryError::Unreadable { path: root, source });
        }

        let extension = self.extension.clone();
        let items = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(move |entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(extension.as_str()))
            })
            .map(|entry| WorkItem::new(entry.into_path()));

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"%PDF-1.4").unwrap();
    }

    fn names(items: impl Iterator<Item = WorkItem>) -> BTreeSet<String> {
        items
            .map(|i| i.path().file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_recursive_match() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a_01-01-2020.pdf");
        touch(dir.path(), "Daily Post/b_02-01-2020.pdf");
        touch(dir.path(), "Daily Post/2020/c.pdf");
        touch(dir.path(), "notes.txt");

        let found = names(WorkDiscoverer::default().discover(dir.path()).unwrap());
        let expected: BTreeSet<String> = ["a_01-01-2020.pdf", "b_02-01-2020.pdf", "c.pdf"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "upper.PDF");
        touch(dir.path(), "lower.pdf");

        let found = names(WorkDiscoverer::default().discover(dir.path()).unwrap());
        assert_eq!(found.len(), 1);
        assert!(found.contains("lower.pdf"));
    }

    #[test]
    fn test_paths_are_absolute() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "x.pdf");

        for item in WorkDiscoverer::default().discover(dir.path()).unwrap() {
            assert!(item.path().is_absolute());
        }
    }

    #[test]
    fn test_restartable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "one.pdf");
        touch(dir.path(), "two.pdf");

        let discoverer = WorkDiscoverer::default();
        let first = names(discoverer.discover(dir.path()).unwrap());
        let second = names(discoverer.discover(dir.path()).unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(WorkDiscoverer::default().discover(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = WorkDiscoverer::default().discover(&dir.path().join("missing"));
        assert!(matches!(result, Err(DiscoveryError::RootNotFound(_))));
    }

    #[test]
    fn test_root_is_file() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.pdf");
        let result = WorkDiscoverer::default().discover(&dir.path().join("file.pdf"));
        assert!(matches!(result, Err(DiscoveryError::NotADirectory(_))));
    }

    #[test]
    fn test_custom_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "scan.tiff");
        touch(dir.path(), "scan.pdf");

        let found = names(WorkDiscoverer::new(".tiff").discover(dir.path()).unwrap());
        assert!(found.contains("scan.tiff"));
        assert_eq!(found.len(), 1);
    }
}
