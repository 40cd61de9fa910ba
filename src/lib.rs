//! shorturl - URL shortener core
//!
//! This library implements the asynchronous link-lifecycle pipeline of a
//! URL shortener: the state machine governing a shortened link from
//! creation through background spam classification, the click-analytics
//! enrichment path, and the queue-mediated bulk-import pipeline.
//!
//! HTTP transport, HTML rendering and the durable storage engine are
//! external collaborators; this crate defines their contracts
//! ([`storage::LinkStore`], [`storage::ClickStore`],
//! [`broker::MessageBroker`], [`services::DenylistSource`]) and ships
//! in-process implementations suitable for tests and single-node
//! deployments.
//!
//! # Architecture
//! - `utils`: hashing, URL validation, user-agent parsing (pure functions)
//! - `storage`: link/click persistence contracts, in-memory backend, retry
//! - `broker`: message delivery contract and in-process broker
//! - `services`: lifecycle orchestrator, classification engine, click
//!   analytics and enrichment, bulk import pipeline
//! - `config`: configuration loading
//! - `system`: logging initialization

pub mod broker;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

pub use config::{Config, get_config, init_config};
pub use errors::{Result, ShortUrlError};
pub use services::{
    AnalyticsService, BulkConsumer, BulkImportProperties, BulkImportReport, BulkImportService,
    ClassificationService, CompletionTracker, CreateLinkProperties, Denylist, EnrichmentService,
    LinkService,
};
pub use storage::{Click, ClickProperties, Link, LinkProperties, RedirectMode};
