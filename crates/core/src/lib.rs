pub mod classifier;
pub mod config;
pub mod discovery;
pub mod extraction;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod processor;
pub mod store;
pub mod testing;

pub use classifier::{Classifier, ClassifierConfig, EntityCategories, EntityKind, TaggedEntity};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use discovery::{DiscoveryError, WorkDiscoverer};
pub use extraction::{
    Capabilities, EntityTagger, ExtractionConfig, ExtractionError, Rasterizer, TaggerConfig,
    TextRecognizer,
};
pub use metadata::DocumentMetadata;
pub use pipeline::{
    CancelSignal, ItemEvent, ItemEventCallback, PipelineConfig, PipelineCoordinator,
    PipelineError, PipelineStatus, RunOptions, RunReport,
};
pub use processor::{
    DocumentProcessor, FailureKind, ItemResult, ProcessingFailure, ProcessingOutcome, WorkItem,
};
pub use store::{
    DocumentFilter, DocumentRecord, DocumentStore, NewDocumentRecord, RunSummary,
    SqliteDocumentStore, StoreError, StoredSummary,
};
