//! ActivityStore port - scheduled activities and the atomic claim.
//!
//! The claim is the only cross-run exclusivity mechanism in the system: it is
//! a compare-and-set on `completed`, so it stays correct even if two pollers
//! run at once (for example during a deploy overlap).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Activity, ActivityId, StoreError};

/// Persistent record of scheduled activities.
///
/// # 設計原則
/// - `list_due` is a read; it may return rows another poller is about to claim
/// - `claim` flips `completed` to true and returns only the ids it flipped
/// - rows are never deleted here (kept for history)
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Unclaimed activities with `finish_at <= now`, at most `limit`,
    /// earliest finish first.
    async fn list_due(&self, now: DateTime<Utc>, limit: usize)
    -> Result<Vec<Activity>, StoreError>;

    /// Atomically mark `ids` completed. Ids that were already completed (or
    /// unknown) are silently left out of the result.
    async fn claim(&self, ids: &[ActivityId]) -> Result<Vec<ActivityId>, StoreError>;
}
