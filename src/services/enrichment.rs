//! Click enrichment engine
//!
//! Best-effort, after-the-fact annotation of a click record with the
//! browser and platform parsed from the User-Agent header. Fire-and-forget
//! from the caller's perspective: nothing here ever propagates an error
//! back to the request that produced the click.
//!
//! Enrichment targets the click by its own id rather than "most recent
//! click for the hash", which is ambiguous under concurrent redirects.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::storage::ClickStore;
use crate::utils::user_agent;

pub struct EnrichmentService {
    clicks: Arc<dyn ClickStore>,
}

impl EnrichmentService {
    pub fn new(clicks: Arc<dyn ClickStore>) -> Self {
        Self { clicks }
    }

    /// Parse the User-Agent and annotate the click. Missing rows and store
    /// failures are logged and swallowed.
    pub async fn enrich(&self, click_id: u64, user_agent: &str) {
        let (browser, platform) = user_agent::parse(user_agent);

        match self
            .clicks
            .update_enrichment(click_id, &browser, &platform)
            .await
        {
            Ok(true) => {
                debug!(
                    "Enriched click {} (browser: {:?}, platform: {:?})",
                    click_id, browser, platform
                );
            }
            Ok(false) => {
                debug!("No un-enriched click {} found, skipping", click_id);
            }
            Err(e) => {
                warn!("Enrichment failed for click {}: {}", click_id, e);
            }
        }
    }
}
