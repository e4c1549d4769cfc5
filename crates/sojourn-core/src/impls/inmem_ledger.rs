//! InMemoryLedger - per-actor banks kept in process memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::domain::{ActorId, Bank, LedgerError};
use crate::ports::Ledger;

/// Ledger backed by a `HashMap<ActorId, Bank>`.
///
/// Each call takes the lock once, so every operation is atomic. The write
/// counter lets tests assert "at most one write per activity".
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    banks: Arc<Mutex<HashMap<ActorId, Bank>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an actor's bank outright (seeding).
    pub async fn set_bank(&self, actor: ActorId, bank: Bank) {
        self.banks.lock().await.insert(actor, bank);
    }

    /// Number of successful mutating calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn holdings(&self, actor: ActorId) -> Result<Bank, LedgerError> {
        Ok(self
            .banks
            .lock()
            .await
            .get(&actor)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, actor: ActorId, items: &Bank) -> Result<(), LedgerError> {
        self.transact(actor, items, &Bank::new()).await
    }

    async fn remove(&self, actor: ActorId, items: &Bank) -> Result<(), LedgerError> {
        self.transact(actor, &Bank::new(), items).await
    }

    async fn transact(
        &self,
        actor: ActorId,
        add: &Bank,
        remove: &Bank,
    ) -> Result<(), LedgerError> {
        let mut banks = self.banks.lock().await;
        let bank = banks.entry(actor).or_default();
        let mut next = bank.clone();
        next.add_bank(add);
        next.try_remove_bank(remove)
            .map_err(|missing| LedgerError::InsufficientHoldings { actor, missing })?;
        *bank = next;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
