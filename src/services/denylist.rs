//! Denylist loading
//!
//! The denylist is read once at startup and held as immutable shared state
//! for the process lifetime. Classification tasks on every worker read it
//! without locking; there is no runtime reload.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;

/// Where denylist entries come from. Read exactly once.
#[async_trait]
pub trait DenylistSource: Send + Sync {
    async fn load_lines(&self) -> Result<Vec<String>>;
}

/// Newline-delimited file of blocked IPs and URLs
pub struct FileDenylistSource {
    path: PathBuf,
}

impl FileDenylistSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DenylistSource for FileDenylistSource {
    async fn load_lines(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(content.lines().map(|line| line.to_string()).collect())
    }
}

/// Immutable set of blocked IPs and target URLs
pub struct Denylist {
    entries: HashSet<String>,
}

impl Denylist {
    /// Load the denylist once at startup. Blank lines and `#` comments are
    /// skipped.
    pub async fn load(source: &dyn DenylistSource) -> Result<Self> {
        let lines = source.load_lines().await?;
        let entries: HashSet<String> = lines
            .into_iter()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        info!("Loaded denylist with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Build directly from entries, for tests and embedding callers
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashSet::new(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
