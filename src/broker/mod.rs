//! Message broker contract
//!
//! The transport itself is an external collaborator; the pipeline depends
//! only on its delivery contract: at-least-once, unordered, possibly
//! concurrent handler invocations. `memory` provides an in-process broker
//! with exactly those semantics for tests and single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;

pub mod memory;
pub mod message;

pub use memory::InProcessBroker;
pub use message::BulkCreateMessage;

#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Invoked once per delivery. Deliveries may repeat and may arrive
    /// concurrently and out of order; handlers must be idempotent.
    async fn handle(&self, payload: String);
}

#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish a message; returns once the broker has accepted it, which
    /// says nothing about whether any consumer has processed it yet.
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;

    async fn subscribe(&self, topic: &str, handler: Arc<dyn MessageHandler>) -> Result<()>;
}
