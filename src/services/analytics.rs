//! Click analytics service
//!
//! Records clicks synchronously on the redirect path and schedules
//! enrichment as a detached task carrying the saved click's id.

use std::sync::Arc;

use tracing::debug;

use crate::errors::Result;
use crate::services::enrichment::EnrichmentService;
use crate::storage::{Click, ClickProperties, ClickStore};

pub struct AnalyticsService {
    clicks: Arc<dyn ClickStore>,
    enricher: Arc<EnrichmentService>,
}

impl AnalyticsService {
    pub fn new(clicks: Arc<dyn ClickStore>, enricher: Arc<EnrichmentService>) -> Self {
        Self { clicks, enricher }
    }

    /// Persist a click for `hash`, then schedule enrichment off the request
    /// path. The returned click already carries its assigned id; the
    /// browser/platform fields fill in later, at most once.
    pub async fn record_click(
        &self,
        hash: &str,
        properties: ClickProperties,
        user_agent: Option<&str>,
    ) -> Result<Click> {
        let click = self.clicks.save(Click::new(hash, properties)).await?;
        debug!("Recorded click {} for {}", click.id, hash);

        if let Some(ua) = user_agent {
            let enricher = self.enricher.clone();
            let ua = ua.to_string();
            let click_id = click.id;
            tokio::spawn(async move {
                enricher.enrich(click_id, &ua).await;
            });
        }

        Ok(click)
    }

    /// All clicks recorded for a hash, in arrival order
    pub async fn summary(&self, hash: &str) -> Result<Vec<Click>> {
        self.clicks.list_by_hash(hash).await
    }
}
