//! Domain identifiers (strongly-typed IDs).
//!
//! All identifiers are ULIDs wrapped in a phantom-typed `Id<T>`, so an
//! `ActivityId` can never be passed where an `ActorId` is expected while the
//! implementation stays shared.
//!
//! ## ULID の特性
//! - 時刻でソート可能: activities created earlier sort first
//! - 分散生成可能: the external scheduler can mint ids without coordination

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each id flavour.
///
/// Provides the prefix used by `Display` ("activity-", "actor-", ...).
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic id type. `T` only exists at compile time.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Fresh id from the current time and thread-local randomness.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    /// Fold the 128 bits into 64, used to derive per-activity RNG seeds.
    pub fn fold_u64(&self) -> u64 {
        let raw = self.ulid.0;
        (raw >> 64) as u64 ^ raw as u64
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityMarker {}

impl IdMarker for ActivityMarker {
    fn prefix() -> &'static str {
        "activity-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActorMarker {}

impl IdMarker for ActorMarker {
    fn prefix() -> &'static str {
        "actor-"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelMarker {}

impl IdMarker for ChannelMarker {
    fn prefix() -> &'static str {
        "channel-"
    }
}

/// Identifier of a scheduled activity (one trip).
pub type ActivityId = Id<ActivityMarker>;

/// Identifier of an actor (the owner of activities and of a bank).
pub type ActorId = Id<ActorMarker>;

/// Identifier of a notification destination.
pub type ChannelId = Id<ChannelMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let ulid = Ulid::new();
        let activity = ActivityId::from_ulid(ulid);
        let actor = ActorId::from_ulid(ulid);

        assert_eq!(activity.as_ulid(), actor.as_ulid());
        assert!(activity.to_string().starts_with("activity-"));
        assert!(actor.to_string().starts_with("actor-"));
        assert!(ChannelId::generate().to_string().starts_with("channel-"));
        // let _: ActorId = activity; // <- does not compile
    }

    #[test]
    fn ids_serialize_as_plain_ulid_strings() {
        let id = ActivityId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_ulid()));
        let back: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn fold_is_stable_for_the_same_id() {
        let id = ActivityId::from_ulid(Ulid(0x0123_4567_89ab_cdef_0000_0000_0000_0001));
        assert_eq!(id.fold_u64(), 0x0123_4567_89ab_cdef ^ 1);
        assert_eq!(id.fold_u64(), id.fold_u64());
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<ActivityId>(), size_of::<Ulid>());
        assert_eq!(size_of::<ActorId>(), 16);
    }
}
