//! Built-in effect handlers.
//!
//! Loot producers run first; `LootDoubling` consumes the cumulative loot and
//! therefore runs last.

mod crate_spawns;
mod implings;
mod loot_doubling;
mod message_in_bottle;
mod moonlight_mutator;
mod pet_perks;
mod random_events;
mod voidling;

use std::sync::Arc;

use super::handler::EffectHandler;

pub use self::crate_spawns::CrateSpawns;
pub use self::implings::Implings;
pub use self::loot_doubling::LootDoubling;
pub use self::message_in_bottle::MessageInABottle;
pub use self::moonlight_mutator::MoonlightMutator;
pub use self::pet_perks::{PetPerk, PetPerks, PerkRolls};
pub use self::random_events::RandomEvents;
pub use self::voidling::Voidling;

/// The documented handler order.
pub fn canonical() -> Vec<Arc<dyn EffectHandler>> {
    vec![
        Arc::new(Implings::new()),
        Arc::new(RandomEvents::new()),
        Arc::new(PetPerks::new()),
        Arc::new(Voidling::new()),
        Arc::new(MessageInABottle::new()),
        Arc::new(CrateSpawns::new()),
        Arc::new(MoonlightMutator::new()),
        Arc::new(LootDoubling::new()),
    ]
}
