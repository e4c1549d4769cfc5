//! ActorDirectory port - actor profiles (tier, flags, equipment).

use async_trait::async_trait;

use crate::domain::{ActorId, ActorProfile, StoreError};

#[async_trait]
pub trait ActorDirectory: Send + Sync {
    async fn profile(&self, actor: ActorId) -> Result<ActorProfile, StoreError>;
}
