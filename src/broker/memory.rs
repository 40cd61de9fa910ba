//! In-process message broker
//!
//! Dispatches each published message to every subscriber of the topic on a
//! detached task. Matches the contract the pipeline is written against:
//! delivery is concurrent, unordered across messages, and the publisher
//! gets no completion signal.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{MessageBroker, MessageHandler};
use crate::errors::Result;

#[derive(Default)]
pub struct InProcessBroker {
    subscribers: DashMap<String, Vec<Arc<dyn MessageHandler>>>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageBroker for InProcessBroker {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        let handlers: Vec<Arc<dyn MessageHandler>> = match self.subscribers.get(topic) {
            Some(entry) => entry.value().clone(),
            None => {
                debug!("No subscribers for topic {}, dropping message", topic);
                return Ok(());
            }
        };

        for handler in handlers {
            let payload = payload.clone();
            tokio::spawn(async move {
                handler.handle(payload).await;
            });
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str, handler: Arc<dyn MessageHandler>) -> Result<()> {
        self.subscribers
            .entry(topic.to_string())
            .or_default()
            .push(handler);
        Ok(())
    }
}
