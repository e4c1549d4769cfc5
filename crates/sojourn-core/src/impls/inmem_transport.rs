//! Transports for development and tests.
//!
//! - `InMemoryTransport`: records every send; destinations can be marked
//!   unusable to simulate a deleted channel
//! - `TracingTransport`: writes notifications to the log

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::domain::{ChannelId, MessageRef, OutgoingMessage, TransportError};
use crate::ports::Transport;

/// One delivered message.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub destination: ChannelId,
    pub message: OutgoingMessage,
    pub reference: MessageRef,
}

#[derive(Clone, Default)]
pub struct InMemoryTransport {
    sent: Arc<Mutex<Vec<SentRecord>>>,
    unusable: Arc<Mutex<HashSet<ChannelId>>>,
    next_ref: Arc<AtomicU64>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_unusable(&self, destination: ChannelId) {
        self.unusable.lock().await.insert(destination);
    }

    pub async fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(
        &self,
        destination: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, TransportError> {
        if self.unusable.lock().await.contains(&destination) {
            return Err(TransportError::UnusableDestination(destination));
        }
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = MessageRef(format!("msg-{n}"));
        self.sent.lock().await.push(SentRecord {
            destination,
            message,
            reference: reference.clone(),
        });
        Ok(reference)
    }
}

/// Logs each notification at info level. Used by the demo binary.
#[derive(Debug, Default)]
pub struct TracingTransport {
    next_ref: AtomicU64,
}

impl TracingTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for TracingTransport {
    async fn send(
        &self,
        destination: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, TransportError> {
        let n = self.next_ref.fetch_add(1, Ordering::SeqCst) + 1;
        let components: Vec<String> = message
            .components
            .iter()
            .map(|c| format!("{c:?}"))
            .collect();
        tracing::info!(
            %destination,
            attachment = message.attachment.as_ref().map(|a| a.file_name.as_str()),
            components = %components.join(" | "),
            "{}",
            message.content
        );
        Ok(MessageRef(format!("log-{n}")))
    }
}
