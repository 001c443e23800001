//! Pipeline module: bounded-parallel batch processing of a scan root.
//!
//! A run proceeds as follows:
//! 1. Ensure the store schema exists (fatal on failure)
//! 2. Validate the scan root and start lazy discovery (fatal on failure)
//! 3. Process documents on at most `min(limit, available parallelism)` workers
//! 4. As each document completes, persist its record and update the totals
//! 5. Append exactly one summary row, with bounded retry
//!
//! A document that fails never stops the run. Cancellation stops dispatch,
//! waits a grace period for in-flight documents, and still writes a summary
//! of what completed.
//!
//! # Example
//!
//! ```ignore
//! use pressroom_core::pipeline::{CancelSignal, PipelineCoordinator, RunOptions};
//!
//! let coordinator = PipelineCoordinator::from_config(&config, capabilities, store);
//! let report = coordinator
//!     .run(Path::new("/archive"), RunOptions::default(), CancelSignal::new())
//!     .await?;
//! println!("{} documents persisted", report.summary.total_files_processed);
//! ```

mod config;
mod coordinator;
mod types;

pub use config::{PipelineConfig, RetryConfig};
pub use coordinator::PipelineCoordinator;
pub use types::{
    CancelSignal, ItemEvent, ItemEventCallback, PersistFailure, PipelineError, PipelineStatus,
    RunOptions, RunReport, RunTotals,
};
