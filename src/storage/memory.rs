//! In-memory storage backend
//!
//! DashMap-backed stores with per-key atomic updates. The map shard lock
//! held by `get_mut` is what makes the single-field updates atomic with
//! respect to concurrent classification of the same hash.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::models::{Click, Link};
use super::{ClickStore, LinkStore};
use crate::errors::{Result, ShortUrlError};

#[derive(Default)]
pub struct InMemoryLinkStore {
    links: DashMap<String, Link>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn get(&self, hash: &str) -> Result<Option<Link>> {
        Ok(self.links.get(hash).map(|entry| entry.value().clone()))
    }

    async fn put(&self, link: Link) -> Result<Link> {
        let hash = link.hash.clone();
        let stored = self.links.entry(hash).or_insert(link).clone();
        Ok(stored)
    }

    async fn update_spam(&self, hash: &str, spam: bool) -> Result<()> {
        match self.links.get_mut(hash) {
            Some(mut entry) => {
                entry.properties.spam = spam;
                Ok(())
            }
            None => Err(ShortUrlError::not_found(format!(
                "no link for hash {}",
                hash
            ))),
        }
    }

    async fn update_processing(&self, hash: &str, processing: bool) -> Result<()> {
        match self.links.get_mut(hash) {
            Some(mut entry) => {
                entry.properties.processing = processing;
                Ok(())
            }
            None => Err(ShortUrlError::not_found(format!(
                "no link for hash {}",
                hash
            ))),
        }
    }
}

pub struct InMemoryClickStore {
    clicks: DashMap<u64, Click>,
    next_id: AtomicU64,
}

impl InMemoryClickStore {
    pub fn new() -> Self {
        Self {
            clicks: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryClickStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClickStore for InMemoryClickStore {
    async fn save(&self, mut click: Click) -> Result<Click> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        click.id = id;
        self.clicks.insert(id, click.clone());
        Ok(click)
    }

    async fn list_by_hash(&self, hash: &str) -> Result<Vec<Click>> {
        let mut clicks: Vec<Click> = self
            .clicks
            .iter()
            .filter(|entry| entry.value().hash == hash)
            .map(|entry| entry.value().clone())
            .collect();
        // ids are assigned in arrival order
        clicks.sort_by_key(|c| c.id);
        Ok(clicks)
    }

    async fn update_enrichment(&self, id: u64, browser: &str, platform: &str) -> Result<bool> {
        match self.clicks.get_mut(&id) {
            Some(mut entry) => {
                if entry.properties.browser.is_some() || entry.properties.platform.is_some() {
                    return Ok(false);
                }
                entry.properties.browser = Some(browser.to_string());
                entry.properties.platform = Some(platform.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
