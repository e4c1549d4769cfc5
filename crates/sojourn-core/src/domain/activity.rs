//! Activity record: one timed background trip owned by an actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ids::{ActivityId, ActorId, ChannelId};

/// Type tag of an activity.
///
/// The catalog of activity types lives with the external simulation; the
/// pipeline only branches on the few properties below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    MonsterKilling,
    GroupMonsterKilling,
    KingGoldemar,
    Ignecarus,
    Inferno,
    Agility,
    Alching,
    Fishing,
    Mining,
    Woodcutting,
    Farming,
    Hunter,
    Thieving,
    Birdhouse,
    ClueCompletion,
    UnderwaterAgilityThieving,
    DepthsOfAtlantis,
}

impl ActivityKind {
    /// Kinds whose loot is never doubled.
    pub fn can_be_doubled(self) -> bool {
        !matches!(
            self,
            ActivityKind::GroupMonsterKilling
                | ActivityKind::KingGoldemar
                | ActivityKind::Ignecarus
                | ActivityKind::Inferno
                | ActivityKind::Alching
                | ActivityKind::Agility
        )
    }

    pub fn is_underwater(self) -> bool {
        matches!(
            self,
            ActivityKind::UnderwaterAgilityThieving | ActivityKind::DepthsOfAtlantis
        )
    }
}

/// A scheduled activity as stored by the activity store.
///
/// Lifecycle: created `completed = false` by the external scheduler; flipped
/// to `completed = true` exactly once by a successful claim, before any side
/// effect runs. Never deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub owner: ActorId,
    pub kind: ActivityKind,

    /// Where the completion notification goes.
    pub channel: ChannelId,

    pub finish_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub completed: bool,

    /// Type-specific payload, opaque to the pipeline except for a few flags.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Activity {
    pub fn new(
        id: ActivityId,
        owner: ActorId,
        kind: ActivityKind,
        channel: ChannelId,
        finish_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            owner,
            kind,
            channel,
            finish_at,
            duration_ms: duration.as_millis() as u64,
            completed: false,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whole minutes of trip time.
    pub fn minutes(&self) -> u64 {
        self.duration_ms / 60_000
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.finish_at <= now
    }

    /// Set by the simulation for trips whose loot must not be doubled.
    pub fn cant_be_doubled(&self) -> bool {
        self.payload
            .get("cant_be_doubled")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}
