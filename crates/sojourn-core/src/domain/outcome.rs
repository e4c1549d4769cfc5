//! Outcome model: what effect handlers contribute and what the processor
//! aggregates from them.
//!
//! This module does not know about stores or ledgers. It only defines the
//! "shape" of results so they can be applied once and explained later.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::bank::Bank;

/// One handler's inventory delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContribution {
    #[serde(default, skip_serializing_if = "Bank::is_empty")]
    pub items_to_add: Bank,
    #[serde(default, skip_serializing_if = "Bank::is_empty")]
    pub items_to_remove: Bank,
}

impl EffectContribution {
    pub fn adding(items: Bank) -> Self {
        Self {
            items_to_add: items,
            items_to_remove: Bank::new(),
        }
    }

    pub fn with_removal(mut self, items: Bank) -> Self {
        self.items_to_remove = items;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items_to_add.is_empty() && self.items_to_remove.is_empty()
    }
}

/// Sum of all contributions of one pipeline run plus the ordered messages.
///
/// Owned by the processor for the duration of one activity and discarded
/// after the single ledger apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedOutcome {
    pub items_to_add: Bank,
    pub items_to_remove: Bank,
    pub messages: Vec<String>,
}

impl AggregatedOutcome {
    pub fn absorb(&mut self, contribution: &EffectContribution) {
        self.items_to_add.add_bank(&contribution.items_to_add);
        self.items_to_remove.add_bank(&contribution.items_to_remove);
    }

    /// No inventory change: the ledger must not be called.
    pub fn has_no_delta(&self) -> bool {
        self.items_to_add.is_empty() && self.items_to_remove.is_empty()
    }
}

/// How a single handler's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum HandlerStatus {
    /// Returned a non-empty contribution that was accepted.
    Contributed,
    /// Ran fine, nothing to add or remove.
    NoEffect,
    /// Contribution dropped: it removed items the actor would not hold.
    Rejected(Bank),
    /// Returned an error or panicked.
    Failed(String),
}

/// Per-handler trace of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerReport {
    pub handler: String,
    pub status: HandlerStatus,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
