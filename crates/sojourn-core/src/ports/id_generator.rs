//! IdGenerator port - ID 生成の抽象化
//!
//! Activities are minted by the external scheduler; this port exists so the
//! scheduler side (and the demo binary) can create time-ordered ids from the
//! same clock the poller reads.

use crate::domain::ids::{ActivityId, ActorId, ChannelId};
use crate::ports::Clock;
use ulid::Ulid;

/// Thread-safe id generator.
pub trait IdGenerator: Send + Sync {
    fn activity_id(&self) -> ActivityId;

    fn actor_id(&self) -> ActorId;

    fn channel_id(&self) -> ChannelId;
}

/// ULID generator whose timestamp part comes from a `Clock`.
///
/// With a `FixedClock` the timestamp is deterministic; the random part still
/// makes every id unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn activity_id(&self) -> ActivityId {
        ActivityId::from(self.next())
    }

    fn actor_id(&self) -> ActorId {
        ActorId::from(self.next())
    }

    fn channel_id(&self) -> ChannelId {
        ChannelId::from(self.next())
    }
}
