//! Link pipeline services
//!
//! The use cases behind the thin transport adapters: lifecycle
//! orchestration, background classification, click analytics with
//! enrichment, and the queue-mediated bulk import pipeline.

pub mod analytics;
pub mod bulk_import;
pub mod classification;
pub mod denylist;
pub mod enrichment;
pub mod lifecycle;

pub use analytics::AnalyticsService;
pub use bulk_import::{
    BulkConsumer, BulkImportProperties, BulkImportReport, BulkImportService, CompletionTracker,
    EMPTY_PRIMARY_HASH, ReportRow,
};
pub use classification::ClassificationService;
pub use denylist::{Denylist, DenylistSource, FileDenylistSource};
pub use enrichment::EnrichmentService;
pub use lifecycle::{CreateLinkProperties, LinkService};
