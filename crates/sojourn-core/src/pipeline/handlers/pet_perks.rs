//! Custom pet perks.
//!
//! One row per pet, keyed by the pet's item id. A row says how the pet rolls
//! (per-minute chance, one roll every N minutes, or a quantity per minute)
//! and how its finds are announced.

use async_trait::async_trait;
use rand::Rng;

use crate::domain::items::{
    self, ADAMANTITE_ORE, AIR_RUNE, BANANA, BLOOD_RUNE, COAL, COINS, DEATH_RUNE, EARTH_RUNE,
    FIRE_RUNE, IRON_ORE, ItemId, LAW_RUNE, LOGS, MAGIC_LOGS, MAPLE_LOGS, MITHRIL_ORE,
    MYSTERY_BOX, NATURE_RUNE, OAK_LOGS, POTATO_SEED, RANARR_SEED, RUNITE_ORE, SNAPDRAGON_SEED,
    TOADFLAX_SEED, UNCUT_DIAMOND, UNCUT_EMERALD, UNCUT_RUBY, UNCUT_SAPPHIRE, WATER_RUNE,
    WATERMELON_SEED, WILLOW_LOGS, YEW_LOGS,
};
use crate::domain::loot::roll;
use crate::domain::{Bank, EffectContribution, HandlerError, LootTable};
use crate::pipeline::{EffectContext, EffectHandler};

/// How a pet turns trip minutes into loot.
pub enum PerkRolls {
    /// Every minute, a `1/one_in` chance of one roll on `table`.
    PerMinuteChance { one_in: u32, table: LootTable },
    /// One roll on `table` per started `every` minutes.
    EveryMinutes { every: u64, table: LootTable },
    /// `min..=max` of `item` for every minute.
    PerMinuteQuantity { item: ItemId, min: u64, max: u64 },
}

pub struct PetPerk {
    pub pet: ItemId,
    pub rolls: PerkRolls,
    pub announce: fn(&Bank) -> String,
}

impl PetPerk {
    fn roll<R: Rng + ?Sized>(&self, rng: &mut R, minutes: u64) -> Bank {
        let mut loot = Bank::new();
        match &self.rolls {
            PerkRolls::PerMinuteChance { one_in, table } => {
                for _ in 0..minutes {
                    if roll(rng, *one_in) {
                        loot.add_bank(&table.roll(rng));
                    }
                }
            }
            PerkRolls::EveryMinutes { every, table } => {
                loot.add_bank(&table.roll_many(rng, minutes.div_ceil((*every).max(1))));
            }
            PerkRolls::PerMinuteQuantity { item, min, max } => {
                for _ in 0..minutes {
                    loot.add(*item, rng.gen_range(*min..=*max));
                }
            }
        }
        loot
    }
}

pub struct PetPerks {
    min_minutes: u64,
    perks: Vec<PetPerk>,
}

impl PetPerks {
    pub fn new() -> Self {
        Self {
            min_minutes: 5,
            perks: vec![
                PetPerk {
                    pet: items::PEKY,
                    rolls: PerkRolls::PerMinuteChance {
                        one_in: 10,
                        table: LootTable::new()
                            .add_range(POTATO_SEED, 1, 4, 40)
                            .add_range(WATERMELON_SEED, 1, 3, 30)
                            .add(TOADFLAX_SEED, 1, 15)
                            .add(SNAPDRAGON_SEED, 1, 8)
                            .add(RANARR_SEED, 1, 7),
                    },
                    announce: |loot| {
                        format!("Peky flew off and got you some seeds during this trip: {loot}.")
                    },
                },
                PetPerk {
                    pet: items::OBIS,
                    rolls: PerkRolls::EveryMinutes {
                        every: 3,
                        table: LootTable::new()
                            .add_range(FIRE_RUNE, 20, 60, 20)
                            .add_range(WATER_RUNE, 20, 60, 20)
                            .add_range(AIR_RUNE, 20, 60, 20)
                            .add_range(EARTH_RUNE, 20, 60, 20)
                            .add_range(NATURE_RUNE, 5, 20, 8)
                            .add_range(LAW_RUNE, 5, 20, 6)
                            .add_range(DEATH_RUNE, 5, 15, 4)
                            .add_range(BLOOD_RUNE, 5, 10, 2),
                    },
                    announce: |loot| {
                        format!("Obis did some runecrafting during this trip and got you: {loot}.")
                    },
                },
                PetPerk {
                    pet: items::BROCK,
                    rolls: PerkRolls::EveryMinutes {
                        every: 3,
                        table: LootTable::new()
                            .add_range(LOGS, 5, 20, 30)
                            .add_range(OAK_LOGS, 5, 15, 25)
                            .add_range(WILLOW_LOGS, 5, 15, 20)
                            .add_range(MAPLE_LOGS, 3, 10, 12)
                            .add_range(YEW_LOGS, 2, 8, 8)
                            .add_range(MAGIC_LOGS, 1, 4, 5),
                    },
                    announce: |loot| {
                        format!("Brock did some woodcutting during this trip and got you: {loot}.")
                    },
                },
                PetPerk {
                    pet: items::WILVUS,
                    rolls: PerkRolls::EveryMinutes {
                        every: 6,
                        table: LootTable::new()
                            .add_range(COINS, 100, 1_000, 60)
                            .add(UNCUT_SAPPHIRE, 1, 15)
                            .add(UNCUT_EMERALD, 1, 12)
                            .add(UNCUT_RUBY, 1, 9)
                            .add(UNCUT_DIAMOND, 1, 4),
                    },
                    announce: |loot| {
                        format!("Wilvus did some pickpocketing during this trip and got you: {loot}.")
                    },
                },
                PetPerk {
                    pet: items::SMOKEY,
                    rolls: PerkRolls::PerMinuteChance {
                        one_in: 450,
                        table: LootTable::new().add(MYSTERY_BOX, 1, 1),
                    },
                    announce: |loot| {
                        format!(
                            "Smokey did some walking around while you were on your trip and found you {loot}."
                        )
                    },
                },
                PetPerk {
                    pet: items::DOUG,
                    rolls: PerkRolls::EveryMinutes {
                        every: 2,
                        table: LootTable::new()
                            .add_range(IRON_ORE, 1, 10, 35)
                            .add_range(COAL, 1, 10, 30)
                            .add_range(MITHRIL_ORE, 1, 6, 20)
                            .add_range(ADAMANTITE_ORE, 1, 4, 10)
                            .add_range(RUNITE_ORE, 1, 2, 5),
                    },
                    announce: |loot| {
                        format!("Doug did some mining while you were on your trip and got you: {loot}.")
                    },
                },
                PetPerk {
                    pet: items::HARRY,
                    rolls: PerkRolls::PerMinuteQuantity {
                        item: BANANA,
                        min: 1,
                        max: 3,
                    },
                    announce: |loot| format!("Harry found you {loot}."),
                },
            ],
        }
    }

    pub fn perk_for(&self, pet: ItemId) -> Option<&PetPerk> {
        self.perks.iter().find(|perk| perk.pet == pet)
    }
}

impl Default for PetPerks {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for PetPerks {
    fn name(&self) -> &str {
        "Custom Pet Perk"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let minutes = ctx.minutes();
        if minutes < self.min_minutes {
            return Ok(None);
        }
        let Some(perk) = ctx.actor.profile.equipped_pet.and_then(|pet| self.perk_for(pet)) else {
            return Ok(None);
        };

        let loot = perk.roll(ctx.rng, minutes);
        if loot.is_empty() {
            return Ok(None);
        }
        ctx.messages.push((perk.announce)(&loot));
        Ok(Some(EffectContribution::adding(loot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActivityKind;
    use crate::pipeline::handlers::testing::{activity, actor, run};
    use rstest::rstest;

    #[tokio::test]
    async fn harry_brings_bananas_every_minute() {
        let who = actor(|p| p.with_pet(items::HARRY), Bank::new());
        let ran = run(&PetPerks::new(), &activity(ActivityKind::Agility, 10), &who, None, 1).await;

        let bananas = ran.added().amount(BANANA);
        assert!((10..=30).contains(&bananas), "got {bananas}");
        assert_eq!(ran.messages, vec![format!("Harry found you {bananas}x Banana.")]);
    }

    #[rstest]
    #[case::obis(items::OBIS, "Obis did some runecrafting")]
    #[case::brock(items::BROCK, "Brock did some woodcutting")]
    #[case::wilvus(items::WILVUS, "Wilvus did some pickpocketing")]
    #[case::doug(items::DOUG, "Doug did some mining")]
    #[tokio::test]
    async fn table_pets_always_find_something(#[case] pet: ItemId, #[case] announcement: &str) {
        let who = actor(|p| p.with_pet(pet), Bank::new());
        let ran = run(&PetPerks::new(), &activity(ActivityKind::Fishing, 30), &who, None, 8).await;

        assert!(!ran.added().is_empty());
        assert!(ran.messages[0].starts_with(announcement));
    }

    #[tokio::test]
    async fn short_trips_and_plain_pets_do_nothing() {
        let harry = actor(|p| p.with_pet(items::HARRY), Bank::new());
        let short = run(&PetPerks::new(), &activity(ActivityKind::Fishing, 4), &harry, None, 1).await;
        assert!(matches!(short.result, Ok(None)));

        let no_perk = actor(|p| p.with_pet(items::VOIDLING), Bank::new());
        let ran = run(&PetPerks::new(), &activity(ActivityKind::Fishing, 60), &no_perk, None, 1).await;
        assert!(matches!(ran.result, Ok(None)));

        let no_pet = actor(|p| p, Bank::new());
        let ran = run(&PetPerks::new(), &activity(ActivityKind::Fishing, 60), &no_pet, None, 1).await;
        assert!(matches!(ran.result, Ok(None)));
    }

    #[test]
    fn every_minutes_rounds_up() {
        let perk = PetPerk {
            pet: items::OBIS,
            rolls: PerkRolls::EveryMinutes {
                every: 3,
                table: LootTable::new().add(FIRE_RUNE, 1, 1),
            },
            announce: |loot| loot.to_string(),
        };
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(0);
        assert_eq!(perk.roll(&mut rng, 10).amount(FIRE_RUNE), 4);
    }
}
