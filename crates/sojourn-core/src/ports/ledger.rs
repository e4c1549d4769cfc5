//! Ledger port - per-actor inventory.

use async_trait::async_trait;

use crate::domain::{ActorId, Bank, LedgerError};

/// Persistent per-actor item store.
///
/// Every call is atomic on its own. `remove` and `transact` fail with
/// `LedgerError::InsufficientHoldings` and change nothing when the actor does
/// not hold everything asked for.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn holdings(&self, actor: ActorId) -> Result<Bank, LedgerError>;

    async fn add(&self, actor: ActorId, items: &Bank) -> Result<(), LedgerError>;

    async fn remove(&self, actor: ActorId, items: &Bank) -> Result<(), LedgerError>;

    /// Add `add` and remove `remove` in one step. Removals may be covered
    /// by what the same call adds.
    async fn transact(&self, actor: ActorId, add: &Bank, remove: &Bank)
    -> Result<(), LedgerError>;
}
