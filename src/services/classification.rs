//! Classification engine
//!
//! Decides, per link, whether the creating IP or the target URL is on the
//! denylist and drives the link to its terminal state. Runs off the request
//! path; the orchestrator spawns it detached and callers observe completion
//! through `is_processing`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{RetryConfig, get_config};
use crate::errors::Result;
use crate::services::denylist::Denylist;
use crate::storage::LinkStore;
use crate::storage::retry::with_retry;

pub struct ClassificationService {
    store: Arc<dyn LinkStore>,
    denylist: Arc<Denylist>,
    retry: RetryConfig,
}

impl ClassificationService {
    pub fn new(store: Arc<dyn LinkStore>, denylist: Arc<Denylist>) -> Self {
        Self {
            store,
            denylist,
            retry: get_config().retry,
        }
    }

    pub fn with_retry_config(
        store: Arc<dyn LinkStore>,
        denylist: Arc<Denylist>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            denylist,
            retry,
        }
    }

    /// Classify one link and move it to its terminal state.
    ///
    /// Safe to invoke concurrently for different hashes; per-hash updates
    /// are atomic at the store. The `processing = false` write is always
    /// the final step, so a failure while flagging spam leaves the link
    /// `processing = true` instead of exposing a half-applied verdict.
    pub async fn classify(
        &self,
        source_ip: Option<&str>,
        target: &str,
        hash: &str,
    ) -> Result<()> {
        let blocked = source_ip.is_some_and(|ip| self.denylist.contains(ip))
            || self.denylist.contains(target);

        if blocked {
            info!("Flagging {} as spam (denylisted origin or target)", hash);
            with_retry("update_spam", self.retry, || {
                self.store.update_spam(hash, true)
            })
            .await?;
        }

        with_retry("update_processing", self.retry, || {
            self.store.update_processing(hash, false)
        })
        .await?;

        debug!("Classification finished for {} (spam: {})", hash, blocked);
        Ok(())
    }

    /// Current spam verdict for a hash. Absent records are not an error:
    /// this query is also used defensively before the link exists.
    pub async fn is_spam(&self, hash: &str) -> bool {
        match self.store.get(hash).await {
            Ok(Some(link)) => link.properties.spam,
            _ => false,
        }
    }
}
