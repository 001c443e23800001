//! Processor module: turns one scanned document into structured results.
//!
//! This module provides the `DocumentProcessor`, which for a single file:
//! - Derives file name, source group and publication date from the path
//! - Rasterizes the document into page images
//! - Recognizes the text of each page, joining pages in order
//! - Tags entities and classifies them into unit and division mentions
//!
//! The processor returns an [`ItemResult`]; failures are values, so a caller
//! running many items concurrently only has to match on the result.
//!
//! # Example
//!
//! ```ignore
//! use pressroom_core::processor::{DocumentProcessor, WorkItem};
//!
//! let processor = DocumentProcessor::new(capabilities, Classifier::default());
//! match processor.process(&WorkItem::new("/archive/post_15-03-2021.pdf")).await {
//!     Ok(outcome) => println!("{} pages in {:.2}s", outcome.page_count, outcome.duration_secs()),
//!     Err(failure) => eprintln!("{}", failure),
//! }
//! ```

mod document;
mod types;

pub use document::DocumentProcessor;
pub use types::{FailureKind, ItemResult, ProcessingFailure, ProcessingOutcome, WorkItem};
