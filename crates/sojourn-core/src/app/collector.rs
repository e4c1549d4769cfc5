//! CollectorManager - at most one live interaction collector per actor
//!
//! A collector is the open "someone may still press a button on this
//! message" channel. Whoever listens for interactions holds the
//! `CollectorHandle` and stops when it is cancelled.
//!
//! # 不変条件
//! - at most one entry per actor
//! - a replaced, cancelled or expired entry has its handle cancelled

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;

use super::ticker::TickerJob;
use crate::domain::{ActorId, MessageRef, TickerError};

/// Listener side of a collector.
#[derive(Debug, Clone)]
pub struct CollectorHandle {
    actor: ActorId,
    message: MessageRef,
    cancel_rx: watch::Receiver<bool>,
}

impl CollectorHandle {
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Resolves once the collector was cancelled (or the manager dropped).
    pub async fn cancelled(&mut self) {
        // Err means the sender is gone, which is a cancellation too
        let _ = self.cancel_rx.wait_for(|cancelled| *cancelled).await;
    }
}

struct Collector {
    message: MessageRef,
    created_at: Instant,
    cancel_tx: watch::Sender<bool>,
}

impl Collector {
    fn cancel(self) {
        // receivers may already be dropped
        let _ = self.cancel_tx.send(true);
    }
}

pub struct CollectorManager {
    ttl: Duration,
    collectors: Mutex<HashMap<ActorId, Collector>>,
}

impl CollectorManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            collectors: Mutex::new(HashMap::new()),
        }
    }

    /// Open a collector for `message`, cancelling the actor's previous one.
    pub async fn register(&self, actor: ActorId, message: MessageRef) -> CollectorHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let collector = Collector {
            message: message.clone(),
            created_at: Instant::now(),
            cancel_tx,
        };
        if let Some(previous) = self.collectors.lock().await.insert(actor, collector) {
            tracing::debug!(actor_id = %actor, message = %previous.message.0, "replaced collector");
            previous.cancel();
        }
        CollectorHandle {
            actor,
            message,
            cancel_rx,
        }
    }

    /// Cancel and forget the actor's collector. Returns whether there was one.
    pub async fn cancel(&self, actor: ActorId) -> bool {
        match self.collectors.lock().await.remove(&actor) {
            Some(collector) => {
                collector.cancel();
                true
            }
            None => false,
        }
    }

    /// Listener handle for the actor's live collector, if any.
    pub async fn handle(&self, actor: ActorId) -> Option<CollectorHandle> {
        self.collectors
            .lock()
            .await
            .get(&actor)
            .map(|collector| CollectorHandle {
                actor,
                message: collector.message.clone(),
                cancel_rx: collector.cancel_tx.subscribe(),
            })
    }

    /// The message the actor's live collector is bound to.
    pub async fn active(&self, actor: ActorId) -> Option<MessageRef> {
        self.collectors
            .lock()
            .await
            .get(&actor)
            .map(|collector| collector.message.clone())
    }

    pub async fn len(&self) -> usize {
        self.collectors.lock().await.len()
    }

    /// Cancel every collector older than the ttl. Returns how many expired.
    pub async fn sweep_expired(&self) -> usize {
        let mut collectors = self.collectors.lock().await;
        let expired: Vec<ActorId> = collectors
            .iter()
            .filter(|(_, collector)| collector.created_at.elapsed() >= self.ttl)
            .map(|(&actor, _)| actor)
            .collect();
        for actor in &expired {
            if let Some(collector) = collectors.remove(actor) {
                collector.cancel();
            }
        }
        expired.len()
    }
}

/// The `collector_sweep` ticker.
pub struct CollectorSweep {
    collectors: Arc<CollectorManager>,
}

impl CollectorSweep {
    pub fn new(collectors: Arc<CollectorManager>) -> Self {
        Self { collectors }
    }
}

#[async_trait]
impl TickerJob for CollectorSweep {
    async fn run(&self) -> Result<(), TickerError> {
        let expired = self.collectors.sweep_expired().await;
        if expired > 0 {
            tracing::debug!(expired, "expired collectors swept");
        }
        Ok(())
    }
}
