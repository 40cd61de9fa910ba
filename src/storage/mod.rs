//! Link and click persistence contracts
//!
//! The durable storage engine is an external collaborator; the pipeline
//! only depends on these traits. `memory` provides the in-process backend
//! used by tests and embedded deployments.

use async_trait::async_trait;

use crate::errors::Result;

pub mod memory;
pub mod models;
pub mod retry;

pub use memory::{InMemoryClickStore, InMemoryLinkStore};
pub use models::{Click, ClickProperties, Link, LinkProperties, RedirectMode};

#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn get(&self, hash: &str) -> Result<Option<Link>>;

    /// Upsert keyed on `hash`. When a record already exists the stored
    /// record wins and is returned unchanged: classification state must
    /// never regress, and re-delivered bulk messages must be no-ops.
    async fn put(&self, link: Link) -> Result<Link>;

    /// Atomic single-field update; fails with `NotFound` for unknown hashes
    async fn update_spam(&self, hash: &str, spam: bool) -> Result<()>;

    /// Atomic single-field update; fails with `NotFound` for unknown hashes
    async fn update_processing(&self, hash: &str, processing: bool) -> Result<()>;
}

#[async_trait]
pub trait ClickStore: Send + Sync {
    /// Persist a click, assigning its sequence id. Returns the stored click.
    async fn save(&self, click: Click) -> Result<Click>;

    /// All clicks recorded for a hash, in arrival order
    async fn list_by_hash(&self, hash: &str) -> Result<Vec<Click>>;

    /// Write-once browser/platform annotation keyed by click id.
    ///
    /// Returns `Ok(false)` when there is no matching un-enriched record;
    /// enrichment is advisory and callers treat that as a no-op.
    async fn update_enrichment(&self, id: u64, browser: &str, platform: &str) -> Result<bool>;
}
