//! Actor snapshot handed to effect handlers and the notification dispatcher.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::bank::Bank;
use super::ids::ActorId;
use super::items::ItemId;

/// Permission tier of an actor. Ordered: higher tiers unlock more actions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PerkTier {
    #[default]
    Zero,
    One,
    Two,
    Three,
    Four,
}

/// Per-actor toggles. Each one independently disables a notification action
/// or a passive effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActorFlag {
    DisableBirdhouseRunButton,
    DisableAutoFarmContractButton,
    DisableAutoSlayButton,
    DisableMoonlightMutator,
}

/// Everything about an actor except their bank, as kept by the actor directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub perk_tier: PerkTier,
    #[serde(default)]
    pub flags: BTreeSet<ActorFlag>,
    #[serde(default)]
    pub equipped_pet: Option<ItemId>,
    #[serde(default)]
    pub equipped: Vec<ItemId>,
    #[serde(default)]
    pub favourite_alchs: Vec<ItemId>,

    // Readiness facts computed by other subsystems; only used to decide
    // which follow-up actions to offer.
    #[serde(default)]
    pub birdhouse_ready: bool,
    #[serde(default)]
    pub can_auto_contract: bool,
    #[serde(default)]
    pub has_slayer_task: bool,
}

impl ActorProfile {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            perk_tier: PerkTier::Zero,
            flags: BTreeSet::new(),
            equipped_pet: None,
            equipped: Vec::new(),
            favourite_alchs: Vec::new(),
            birdhouse_ready: false,
            can_auto_contract: false,
            has_slayer_task: false,
        }
    }

    pub fn with_perk_tier(mut self, tier: PerkTier) -> Self {
        self.perk_tier = tier;
        self
    }

    pub fn with_flag(mut self, flag: ActorFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn with_pet(mut self, pet: ItemId) -> Self {
        self.equipped_pet = Some(pet);
        self
    }
}

/// Point-in-time view of an actor: profile plus bank at processing start.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub profile: ActorProfile,
    pub bank: Bank,
}

impl Actor {
    pub fn new(profile: ActorProfile, bank: Bank) -> Self {
        Self { profile, bank }
    }

    pub fn id(&self) -> ActorId {
        self.profile.id
    }

    pub fn perk_tier(&self) -> PerkTier {
        self.profile.perk_tier
    }

    pub fn has_flag(&self, flag: ActorFlag) -> bool {
        self.profile.flags.contains(&flag)
    }

    pub fn uses_pet(&self, pet: ItemId) -> bool {
        self.profile.equipped_pet == Some(pet)
    }

    pub fn has_equipped(&self, item: ItemId) -> bool {
        self.profile.equipped.contains(&item) || self.uses_pet(item)
    }

    /// Held in the bank or worn.
    pub fn owns_item(&self, item: ItemId) -> bool {
        self.bank.has(item) || self.has_equipped(item)
    }

    pub fn owns(&self, items: &Bank) -> bool {
        self.bank.contains_all(items)
    }
}
