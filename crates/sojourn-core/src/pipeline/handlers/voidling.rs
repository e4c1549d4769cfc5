//! Voidling: alchs the actor's favourite alchables during the trip.
//!
//! Equipped, the Voidling alchs for the whole trip (three times as much with
//! the magic master cape). Merely owned, it only manages a sixth or seventh of
//! the trip, unless the cape is worn.

use async_trait::async_trait;
use rand::Rng;

use crate::domain::items::{self, COINS, FIRE_RUNE, MAGIC_MASTER_CAPE, NATURE_RUNE, VOIDLING};
use crate::domain::{Bank, EffectContribution, HandlerError};
use crate::pipeline::{EffectContext, EffectHandler};

const FIRE_RUNES_PER_CAST: u64 = 5;
const NATURE_RUNES_PER_CAST: u64 = 1;

pub struct Voidling {
    casts_per_minute: u64,
}

impl Voidling {
    pub fn new() -> Self {
        Self {
            casts_per_minute: 20,
        }
    }
}

impl Default for Voidling {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for Voidling {
    fn name(&self) -> &str {
        "Voidling"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let actor = ctx.actor;
        if !actor.owns_item(VOIDLING) {
            return Ok(None);
        }
        let favourites = &actor.profile.favourite_alchs;
        if favourites.is_empty() {
            return Ok(None);
        }

        if !ctx.holdings.has(NATURE_RUNE) || !ctx.holdings.has(FIRE_RUNE) {
            ctx.messages.push(
                "Your Voidling didn't alch anything because you either don't have any nature runes or fire runes.",
            );
            return Ok(None);
        }

        let Some((item, value)) = favourites.iter().find_map(|&item| {
            items::alch_value(item)
                .filter(|_| ctx.holdings.has(item))
                .map(|value| (item, value))
        }) else {
            return Ok(None);
        };

        let equipped = actor.uses_pet(VOIDLING);
        let cape = actor.has_equipped(MAGIC_MASTER_CAPE);
        let minutes = ctx.minutes();
        let alching_minutes = match (equipped, cape) {
            (true, true) => minutes * 3,
            (true, false) | (false, true) => minutes,
            (false, false) => minutes / ctx.rng.gen_range(6..=7),
        };

        let casts = (alching_minutes * self.casts_per_minute).min(ctx.holdings.amount(item));
        if casts == 0 {
            return Ok(None);
        }

        let cost = Bank::new()
            .with(item, casts)
            .with(NATURE_RUNE, casts * NATURE_RUNES_PER_CAST)
            .with(FIRE_RUNE, casts * FIRE_RUNES_PER_CAST);
        if !ctx.holdings.contains_all(&cost) {
            ctx.messages.push(format!(
                "Your Voidling couldn't do any alching because you don't own {cost}."
            ));
            return Ok(None);
        }

        let coins = casts * value;
        ctx.messages
            .push(format!("Your Voidling alched {casts}x {item} for {coins} GP."));
        Ok(Some(
            EffectContribution::adding(Bank::new().with(COINS, coins)).with_removal(cost),
        ))
    }
}
