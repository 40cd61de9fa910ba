//! Link lifecycle orchestrator
//!
//! Owns the per-hash state machine: `Created (processing = true)` →
//! `Classified (processing = false, spam = true|false)`. Creation returns
//! before classification runs; the terminal transition is made exactly
//! once, by the classification engine, on a detached task.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use crate::errors::{Result, ShortUrlError};
use crate::services::classification::ClassificationService;
use crate::storage::{Link, LinkProperties, LinkStore, RedirectMode};
use crate::utils::compute_hash;
use crate::utils::url_validator::validate_url;

/// Caller-supplied properties for link creation
#[derive(Debug, Clone)]
pub struct CreateLinkProperties {
    pub owner_ip: Option<String>,
    pub sponsor: Option<String>,
    pub safe: bool,
    pub mode: RedirectMode,
}

impl Default for CreateLinkProperties {
    fn default() -> Self {
        Self {
            owner_ip: None,
            sponsor: None,
            safe: true,
            mode: RedirectMode::default(),
        }
    }
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    classifier: Arc<ClassificationService>,
}

impl LinkService {
    pub fn new(store: Arc<dyn LinkStore>, classifier: Arc<ClassificationService>) -> Self {
        Self { store, classifier }
    }

    /// Create a shortened link.
    ///
    /// Persists the record with `processing = true` and returns it
    /// immediately; classification is scheduled exactly once per call on a
    /// detached task with no return channel. Completion is observable only
    /// through [`LinkService::is_processing`].
    pub async fn create(&self, target: &str, properties: CreateLinkProperties) -> Result<Link> {
        validate_url(target)
            .map_err(|e| ShortUrlError::invalid_target(format!("[{}] {}", target, e)))?;

        let hash = compute_hash(target);
        let link = Link {
            hash: hash.clone(),
            target: target.to_string(),
            mode: properties.mode,
            created_at: Utc::now(),
            properties: LinkProperties {
                owner_ip: properties.owner_ip.clone(),
                sponsor: properties.sponsor,
                safe: properties.safe,
                spam: false,
                processing: true,
            },
        };

        let stored = self.store.put(link).await?;
        debug!("Created link {} -> {}", hash, target);

        let classifier = self.classifier.clone();
        let source_ip = properties.owner_ip;
        let target = target.to_string();
        let task_hash = hash.clone();
        tokio::spawn(async move {
            if let Err(e) = classifier
                .classify(source_ip.as_deref(), &target, &task_hash)
                .await
            {
                // Swallowed: the creating request has long since returned.
                // The link stays processing = true.
                error!("Classification failed for {}: {}", task_hash, e);
            }
        });

        Ok(stored)
    }

    /// Resolve a hash for redirection.
    ///
    /// Returns the current record; interpreting `processing`, `spam` and
    /// `mode` into a transport-level response is the caller's job, which
    /// keeps the state machine transport-agnostic.
    pub async fn redirect_to(&self, hash: &str) -> Result<Link> {
        self.store
            .get(hash)
            .await?
            .ok_or_else(|| ShortUrlError::not_found(format!("[{}] is not known", hash)))
    }

    /// Latest committed `processing` flag for a hash
    pub async fn is_processing(&self, hash: &str) -> Result<bool> {
        let link = self
            .store
            .get(hash)
            .await?
            .ok_or_else(|| ShortUrlError::not_found(format!("[{}] is not known", hash)))?;
        Ok(link.properties.processing)
    }

    /// Whether the link carries a sponsor tag; false for unknown hashes
    pub async fn has_sponsor(&self, hash: &str) -> bool {
        match self.store.get(hash).await {
            Ok(Some(link)) => link.properties.sponsor.is_some(),
            _ => false,
        }
    }
}
