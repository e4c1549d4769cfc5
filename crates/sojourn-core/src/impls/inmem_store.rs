//! InMemoryActivityStore - 開発用の activity store
//!
//! # 学習ポイント
//! - tokio Mutex で claim を compare-and-set にする
//! - ロックを await 跨ぎで保持しない（全操作がロック内で同期的に完結）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::{Activity, ActivityId, StoreError};
use crate::ports::ActivityStore;

/// Activity store kept in process memory.
///
/// Also plays the part of the external scheduler through `insert`, and can
/// be switched to "unavailable" to exercise failure paths.
#[derive(Clone, Default)]
pub struct InMemoryActivityStore {
    activities: Arc<Mutex<HashMap<ActivityId, Activity>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an activity (what the external scheduler does).
    pub async fn insert(&self, activity: Activity) {
        self.activities.lock().await.insert(activity.id, activity);
    }

    pub async fn get(&self, id: ActivityId) -> Option<Activity> {
        self.activities.lock().await.get(&id).cloned()
    }

    pub async fn pending_count(&self) -> usize {
        self.activities
            .lock()
            .await
            .values()
            .filter(|a| !a.completed)
            .count()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn list_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Activity>, StoreError> {
        self.check_available()?;
        let activities = self.activities.lock().await;
        let mut due: Vec<Activity> = activities
            .values()
            .filter(|a| a.is_due(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.finish_at.cmp(&b.finish_at).then(a.id.cmp(&b.id)));
        due.truncate(limit);
        Ok(due)
    }

    async fn claim(&self, ids: &[ActivityId]) -> Result<Vec<ActivityId>, StoreError> {
        self.check_available()?;
        let mut activities = self.activities.lock().await;
        let mut claimed = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(activity) = activities.get_mut(id)
                && !activity.completed
            {
                activity.completed = true;
                claimed.push(*id);
            }
        }
        Ok(claimed)
    }
}
