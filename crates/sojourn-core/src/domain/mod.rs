//! Domain model (ids, items, banks, activities, actors, outcomes, errors).

pub mod activity;
pub mod actor;
pub mod bank;
pub mod clue;
pub mod errors;
pub mod ids;
pub mod items;
pub mod loot;
pub mod notification;
pub mod outcome;

pub use activity::{Activity, ActivityKind};
pub use actor::{Actor, ActorFlag, ActorProfile, PerkTier};
pub use bank::Bank;
pub use clue::ClueTier;
pub use errors::{
    HandlerError, LedgerError, ResolveError, StoreError, TickerError, TransportError,
};
pub use ids::{ActivityId, ActorId, ChannelId};
pub use items::ItemId;
pub use loot::LootTable;
pub use notification::{Attachment, Component, MessageRef, OutgoingMessage};
pub use outcome::{AggregatedOutcome, EffectContribution, HandlerReport, HandlerStatus};
