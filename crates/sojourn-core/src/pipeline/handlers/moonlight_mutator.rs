//! Moonlight mutator: while the actor is away it mutates mort myre fungus
//! from the bank; some of the mutations survive as zygomite seeds.

use async_trait::async_trait;

use crate::domain::items::{MOONLIGHT_MUTATOR, MORT_MYRE_FUNGUS, MUTATED_ZYGOMITE_SEED};
use crate::domain::loot::roll;
use crate::domain::{ActorFlag, Bank, EffectContribution, HandlerError};
use crate::pipeline::{EffectContext, EffectHandler};

pub struct MoonlightMutator {
    minutes_per_mutation: u64,
    survives_one_in: u32,
}

impl MoonlightMutator {
    pub fn new() -> Self {
        Self {
            minutes_per_mutation: 2,
            survives_one_in: 4,
        }
    }
}

impl Default for MoonlightMutator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for MoonlightMutator {
    fn name(&self) -> &str {
        "Moonlight Mutator"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let actor = ctx.actor;
        if !actor.bank.has(MOONLIGHT_MUTATOR) || actor.has_flag(ActorFlag::DisableMoonlightMutator)
        {
            return Ok(None);
        }

        let mutations =
            (ctx.minutes() / self.minutes_per_mutation).min(actor.bank.amount(MORT_MYRE_FUNGUS));
        if mutations == 0 {
            return Ok(None);
        }

        let cost = Bank::new().with(MORT_MYRE_FUNGUS, mutations);
        if !ctx.holdings.contains_all(&cost) {
            tracing::error!(
                actor_id = %actor.id(),
                %cost,
                "moonlight mutator cost is no longer held"
            );
            return Ok(None);
        }

        let survivors = (0..mutations)
            .filter(|_| roll(ctx.rng, self.survives_one_in))
            .count() as u64;
        let loot = Bank::new().with(MUTATED_ZYGOMITE_SEED, survivors);

        if loot.is_empty() {
            ctx.messages.push(format!("Mutated {cost}, but all died"));
        } else {
            ctx.messages.push(format!("Mutated {cost}; {loot} survived"));
        }
        Ok(Some(EffectContribution::adding(loot).with_removal(cost)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActivityKind;
    use crate::pipeline::handlers::testing::{activity, actor, run};

    fn mutator_bank(fungus: u64) -> Bank {
        Bank::new()
            .with(MOONLIGHT_MUTATOR, 1)
            .with(MORT_MYRE_FUNGUS, fungus)
    }

    #[tokio::test]
    async fn consumes_fungus_bounded_by_trip_and_bank() {
        let who = actor(|p| p, mutator_bank(20));
        let ran = run(
            &MoonlightMutator::new(),
            &activity(ActivityKind::Farming, 60),
            &who,
            None,
            4,
        )
        .await;

        assert_eq!(ran.removed(), Bank::new().with(MORT_MYRE_FUNGUS, 20));
        assert!(ran.added().amount(MUTATED_ZYGOMITE_SEED) <= 20);
        assert!(ran.messages[0].starts_with("Mutated 20x Mort myre fungus"));
    }

    #[tokio::test]
    async fn short_trip_uses_fewer_fungus() {
        let who = actor(|p| p, mutator_bank(20));
        let ran = run(
            &MoonlightMutator::new(),
            &activity(ActivityKind::Farming, 10),
            &who,
            None,
            4,
        )
        .await;
        assert_eq!(ran.removed(), Bank::new().with(MORT_MYRE_FUNGUS, 5));
    }

    #[tokio::test]
    async fn disabled_or_missing_mutator_does_nothing() {
        let disabled = actor(
            |p| p.with_flag(ActorFlag::DisableMoonlightMutator),
            mutator_bank(20),
        );
        let ran = run(
            &MoonlightMutator::new(),
            &activity(ActivityKind::Farming, 60),
            &disabled,
            None,
            4,
        )
        .await;
        assert!(matches!(ran.result, Ok(None)));

        let no_mutator = actor(|p| p, Bank::new().with(MORT_MYRE_FUNGUS, 20));
        let ran = run(
            &MoonlightMutator::new(),
            &activity(ActivityKind::Farming, 60),
            &no_mutator,
            None,
            4,
        )
        .await;
        assert!(matches!(ran.result, Ok(None)));
        assert!(ran.messages.is_empty());
    }
}
