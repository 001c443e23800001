//! Types for the extraction module.

use std::path::{Path, PathBuf};

/// One rendered page of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number.
    pub page_number: usize,
    /// Location of the rendered image.
    pub path: PathBuf,
}

/// Rendered pages of one document, in page order.
///
/// When the pages live in a scratch directory the set owns it and removes it
/// on drop, so intermediate images never outlive the item.
#[derive(Debug)]
pub struct PageSet {
    pages: Vec<PageImage>,
    scratch_dir: Option<PathBuf>,
}

impl PageSet {
    /// Creates a page set that does not own any directory.
    pub fn new(mut pages: Vec<PageImage>) -> Self {
        pages.sort_by_key(|p| p.page_number);
        Self {
            pages,
            scratch_dir: None,
        }
    }

    /// Creates a page set that removes `scratch_dir` when dropped.
    pub fn with_scratch_dir(pages: Vec<PageImage>, scratch_dir: PathBuf) -> Self {
        let mut set = Self::new(pages);
        set.scratch_dir = Some(scratch_dir);
        set
    }

    pub(crate) fn replace_pages(&mut self, mut pages: Vec<PageImage>) {
        pages.sort_by_key(|p| p.page_number);
        self.pages = pages;
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }
}

impl Drop for PageSet {
    fn drop(&mut self) {
        if let Some(dir) = self.scratch_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                tracing::debug!("Failed to remove scratch dir {:?}: {}", dir, e);
            }
        }
    }
}
