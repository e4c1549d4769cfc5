//! Random events: at most one per trip, more likely the longer the trip.

use async_trait::async_trait;
use rand::Rng;

use crate::domain::items::{
    BAGUETTE, COINS, FROG_TOKEN, LAMP, MIME_MASK, UNCUT_DIAMOND, UNCUT_RUBY, UNCUT_SAPPHIRE,
};
use crate::domain::loot::per_hour_chance;
use crate::domain::{EffectContribution, HandlerError, LootTable};
use crate::pipeline::{EffectContext, EffectHandler};

struct RandomEvent {
    name: &'static str,
    loot: LootTable,
}

pub struct RandomEvents {
    per_hour: f64,
    min_minutes: u64,
    events: Vec<RandomEvent>,
}

impl RandomEvents {
    pub fn new() -> Self {
        Self {
            per_hour: 0.5,
            min_minutes: 5,
            events: vec![
                RandomEvent {
                    name: "Genie",
                    loot: LootTable::new().add(LAMP, 1, 1),
                },
                RandomEvent {
                    name: "Mime",
                    loot: LootTable::new().add(MIME_MASK, 1, 1),
                },
                RandomEvent {
                    name: "Kiss the frog",
                    loot: LootTable::new().add(FROG_TOKEN, 1, 1),
                },
                RandomEvent {
                    name: "Sandwich lady",
                    loot: LootTable::new().add(BAGUETTE, 1, 1),
                },
                RandomEvent {
                    name: "Certers",
                    loot: LootTable::new().add_range(COINS, 500, 2_000, 1),
                },
                RandomEvent {
                    name: "Rick Turpentine",
                    loot: LootTable::new()
                        .add_range(COINS, 1_000, 5_000, 6)
                        .add(UNCUT_SAPPHIRE, 1, 3)
                        .add(UNCUT_RUBY, 1, 2)
                        .add(UNCUT_DIAMOND, 1, 1),
                },
            ],
        }
    }

    /// Override the chance per hour of trip time (clamped to 100%).
    pub fn with_rate(mut self, per_hour: f64) -> Self {
        self.per_hour = per_hour;
        self
    }
}

impl Default for RandomEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for RandomEvents {
    fn name(&self) -> &str {
        "Random Events"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let minutes = ctx.minutes();
        if minutes < self.min_minutes || self.events.is_empty() {
            return Ok(None);
        }
        if !per_hour_chance(ctx.rng, minutes, self.per_hour) {
            return Ok(None);
        }

        let event = &self.events[ctx.rng.gen_range(0..self.events.len())];
        let loot = event.loot.roll(ctx.rng);
        ctx.messages.push(format!(
            "You did the {} random event and received {loot}.",
            event.name
        ));
        Ok(Some(EffectContribution::adding(loot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityKind, Bank};
    use crate::pipeline::handlers::testing::{activity, actor, run};

    #[tokio::test]
    async fn a_sure_event_gives_exactly_one_reward() {
        let handler = RandomEvents::new().with_rate(60.0);
        let who = actor(|p| p, Bank::new());
        let ran = run(&handler, &activity(ActivityKind::Mining, 30), &who, None, 5).await;

        assert!(!ran.added().is_empty());
        assert_eq!(ran.messages.len(), 1);
        assert!(ran.messages[0].starts_with("You did the "));
    }

    #[tokio::test]
    async fn short_trips_have_no_events() {
        let handler = RandomEvents::new().with_rate(60.0);
        let who = actor(|p| p, Bank::new());
        for seed in 0..20 {
            let ran = run(&handler, &activity(ActivityKind::Mining, 4), &who, None, seed).await;
            assert!(matches!(ran.result, Ok(None)));
        }
    }

    #[tokio::test]
    async fn zero_rate_never_fires() {
        let handler = RandomEvents::new().with_rate(0.0);
        let who = actor(|p| p, Bank::new());
        for seed in 0..20 {
            let ran = run(&handler, &activity(ActivityKind::Mining, 600), &who, None, seed).await;
            assert!(matches!(ran.result, Ok(None)));
        }
    }
}
