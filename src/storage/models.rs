use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// How the transport adapter should redirect a resolved link.
///
/// Serialized as the HTTP status code it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum RedirectMode {
    Permanent = 301,
    #[default]
    Temporary = 307,
}

impl RedirectMode {
    pub fn status_code(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkProperties {
    #[serde(default)]
    pub owner_ip: Option<String>,
    #[serde(default)]
    pub sponsor: Option<String>,
    pub safe: bool,
    pub spam: bool,
    /// True until classification has produced its terminal verdict. While
    /// set, `spam` must not be treated as authoritative. Never goes back to
    /// true once cleared.
    pub processing: bool,
}

impl Default for LinkProperties {
    fn default() -> Self {
        Self {
            owner_ip: None,
            sponsor: None,
            safe: true,
            spam: false,
            processing: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub hash: String,
    pub target: String,
    pub mode: RedirectMode,
    pub created_at: DateTime<Utc>,
    pub properties: LinkProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickProperties {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    /// Filled in once, after the fact, by the enrichment engine
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Click {
    /// Sequence id assigned by the click store; 0 until saved
    pub id: u64,
    pub hash: String,
    pub occurred_at: DateTime<Utc>,
    pub properties: ClickProperties,
}

impl Click {
    pub fn new(hash: impl Into<String>, properties: ClickProperties) -> Self {
        Self {
            id: 0,
            hash: hash.into(),
            occurred_at: Utc::now(),
            properties,
        }
    }
}
