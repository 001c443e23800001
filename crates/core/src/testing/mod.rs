//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the extraction capabilities
//! and of the document store, so the processor and the pipeline can be
//! exercised without poppler, tesseract or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use pressroom_core::testing::{MockDocumentStore, MockRasterizer, MockRecognizer, MockTagger};
//!
//! let rasterizer = MockRasterizer::new();
//! rasterizer.set_delay(Duration::from_millis(20));
//! rasterizer.fail_path("/archive/corrupt.pdf");
//!
//! let store = Arc::new(MockDocumentStore::new());
//! store.fail_next_summaries(1);
//! ```

mod mock_extraction;
mod mock_store;

pub use mock_extraction::{MockRasterizer, MockRecognizer, MockTagger};
pub use mock_store::MockDocumentStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::{MockRasterizer, MockRecognizer, MockTagger};
    use crate::classifier::{EntityKind, TaggedEntity};
    use crate::extraction::Capabilities;
    use crate::metadata::{file_name_of, source_group_of};
    use crate::processor::ProcessingOutcome;

    /// Mock capabilities plus handles to the mocks for configuring them.
    pub struct MockCapabilities {
        pub capabilities: Capabilities,
        pub rasterizer: MockRasterizer,
        pub recognizer: MockRecognizer,
        pub tagger: MockTagger,
    }

    /// Create mock capabilities with one page per document.
    pub fn mock_capabilities() -> MockCapabilities {
        let rasterizer = MockRasterizer::new();
        let recognizer = MockRecognizer::new();
        let tagger = MockTagger::new();
        let capabilities = Capabilities::new(
            Arc::new(rasterizer.clone()),
            Arc::new(recognizer.clone()),
            Arc::new(tagger.clone()),
        );
        MockCapabilities {
            capabilities,
            rasterizer,
            recognizer,
            tagger,
        }
    }

    /// Write placeholder documents under `root`, creating parent directories.
    ///
    /// Returns the absolute paths in the order given.
    pub fn write_documents(root: &Path, relative_paths: &[&str]) -> Vec<PathBuf> {
        relative_paths
            .iter()
            .map(|rel| {
                let path = root.join(rel);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).expect("create fixture directory");
                }
                std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").expect("write fixture document");
                path
            })
            .collect()
    }

    /// Dated document names, `doc_NN_01-01-2020.pdf` for `NN` in `0..count`.
    pub fn dated_names(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("doc_{:02}_01-01-2020.pdf", i))
            .collect()
    }

    /// Create a tagged organization entity.
    pub fn org(text: &str) -> TaggedEntity {
        TaggedEntity::new(text, EntityKind::Organization)
    }

    /// Create a tagged geo-political entity.
    pub fn gpe(text: &str) -> TaggedEntity {
        TaggedEntity::new(text, EntityKind::GeoPolitical)
    }

    /// Create a processing outcome with reasonable defaults.
    pub fn outcome(path: &str, publication_date: Option<NaiveDate>) -> ProcessingOutcome {
        let path = PathBuf::from(path);
        ProcessingOutcome {
            file_name: file_name_of(&path),
            source_group: source_group_of(&path),
            path,
            publication_date,
            elapsed: Duration::from_millis(250),
            page_count: 1,
            military_units: vec![],
            political_divisions: vec![],
        }
    }
}
