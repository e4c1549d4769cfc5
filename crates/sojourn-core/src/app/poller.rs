//! ActivityPoller - the `minion_activities` ticker
//!
//! # 処理フロー
//! 1. `list_due(now, batch_size)`: due, unclaimed activities
//! 2. `claim(ids)`: only the ids this call flipped are ours
//! 3. process claimed activities concurrently across owners, one after
//!    another within an owner; await the whole batch
//!
//! An activity is processed at most once no matter how many polls see it
//! as due: whoever loses the claim simply skips it.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::processor::ActivityProcessor;
use super::ticker::TickerJob;
use crate::domain::{Activity, ActivityId, ActorId, StoreError, TickerError};
use crate::ports::{ActivityStore, Clock};

/// Counts for one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub due: usize,
    pub claimed: usize,
    pub processed: usize,
    pub failed: usize,
}

pub struct ActivityPoller {
    store: Arc<dyn ActivityStore>,
    processor: Arc<ActivityProcessor>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
}

impl ActivityPoller {
    pub fn new(
        store: Arc<dyn ActivityStore>,
        processor: Arc<ActivityProcessor>,
        clock: Arc<dyn Clock>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            processor,
            clock,
            batch_size,
        }
    }

    /// One poll cycle. Store errors abort the cycle; processing errors are
    /// counted and logged per activity.
    pub async fn poll_once(&self) -> Result<PollReport, StoreError> {
        let due = self
            .store
            .list_due(self.clock.now(), self.batch_size)
            .await?;
        let mut report = PollReport {
            due: due.len(),
            ..PollReport::default()
        };
        if due.is_empty() {
            return Ok(report);
        }

        let ids: Vec<ActivityId> = due.iter().map(|a| a.id).collect();
        let claimed: HashSet<ActivityId> = self.store.claim(&ids).await?.into_iter().collect();
        report.claimed = claimed.len();

        // one task per owner: an owner's activities run in due order, so
        // each one snapshots the bank the previous one left behind
        let mut by_owner: Vec<(ActorId, Vec<Activity>)> = Vec::new();
        for activity in due {
            if !claimed.contains(&activity.id) {
                tracing::debug!(activity_id = %activity.id, "claimed elsewhere, skipping");
                continue;
            }
            match by_owner.iter_mut().find(|(owner, _)| *owner == activity.owner) {
                Some((_, group)) => group.push(activity),
                None => by_owner.push((activity.owner, vec![activity])),
            }
        }

        let mut batch = JoinSet::new();
        let mut group_sizes = HashMap::new();
        for (_, group) in by_owner {
            let processor = Arc::clone(&self.processor);
            let size = group.len();
            let handle = batch.spawn(async move {
                let mut results = Vec::with_capacity(group.len());
                for activity in group {
                    let result = processor.process(&activity).await;
                    results.push((activity.id, result));
                }
                results
            });
            group_sizes.insert(handle.id(), size);
        }

        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(results) => {
                    for (activity_id, result) in results {
                        match result {
                            Ok(_) => report.processed += 1,
                            Err(err) => {
                                report.failed += 1;
                                tracing::error!(%activity_id, error = %err, "activity processing failed");
                            }
                        }
                    }
                }
                Err(err) => {
                    report.failed += group_sizes.get(&err.id()).copied().unwrap_or(1);
                    tracing::error!(error = %err, "activity task ended abnormally");
                }
            }
        }

        if report.claimed > 0 {
            tracing::info!(
                due = report.due,
                claimed = report.claimed,
                processed = report.processed,
                failed = report.failed,
                "poll finished"
            );
        }
        Ok(report)
    }
}

#[async_trait]
impl TickerJob for ActivityPoller {
    async fn run(&self) -> Result<(), TickerError> {
        self.poll_once().await?;
        Ok(())
    }
}
