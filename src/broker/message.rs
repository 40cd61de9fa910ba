//! Bulk creation message wire format
//!
//! JSON rather than a plain field delimiter: every delimiter character is
//! legal somewhere in a URL, so a delimited record corrupts as soon as a
//! target contains it. serde_json escapes everything.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateMessage {
    /// Original target URL, already validated by the publisher
    pub target: String,
    /// Precomputed by the publisher so the consumer and the report agree
    pub hash: String,
    pub safe: bool,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub sponsor: Option<String>,
}

impl BulkCreateMessage {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
