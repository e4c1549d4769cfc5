//! InMemoryActorDirectory - actor profiles kept in process memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{ActorId, ActorProfile, StoreError};
use crate::ports::ActorDirectory;

#[derive(Clone, Default)]
pub struct InMemoryActorDirectory {
    profiles: Arc<RwLock<HashMap<ActorId, ActorProfile>>>,
}

impl InMemoryActorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, profile: ActorProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl ActorDirectory for InMemoryActorDirectory {
    async fn profile(&self, actor: ActorId) -> Result<ActorProfile, StoreError> {
        self.profiles
            .read()
            .await
            .get(&actor)
            .cloned()
            .ok_or(StoreError::ActorNotFound(actor))
    }
}
