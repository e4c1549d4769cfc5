//! Passive impling catches: each trip minute has a small chance of catching
//! an impling on the way.

use async_trait::async_trait;

use crate::domain::items::{
    BABY_IMPLING_JAR, DRAGON_IMPLING_JAR, EARTH_IMPLING_JAR, ECLECTIC_IMPLING_JAR,
    ESSENCE_IMPLING_JAR, GOURMET_IMPLING_JAR, LUCKY_IMPLING_JAR, MAGPIE_IMPLING_JAR,
    NATURE_IMPLING_JAR, NINJA_IMPLING_JAR, YOUNG_IMPLING_JAR,
};
use crate::domain::loot::roll;
use crate::domain::{ActivityKind, Bank, EffectContribution, HandlerError, LootTable};
use crate::pipeline::{EffectContext, EffectHandler};

pub struct Implings {
    one_in_per_minute: u32,
    table: LootTable,
}

impl Implings {
    pub fn new() -> Self {
        Self {
            one_in_per_minute: 25,
            table: LootTable::new()
                .add(BABY_IMPLING_JAR, 1, 80)
                .add(YOUNG_IMPLING_JAR, 1, 60)
                .add(GOURMET_IMPLING_JAR, 1, 45)
                .add(EARTH_IMPLING_JAR, 1, 35)
                .add(ESSENCE_IMPLING_JAR, 1, 30)
                .add(ECLECTIC_IMPLING_JAR, 1, 25)
                .add(NATURE_IMPLING_JAR, 1, 20)
                .add(MAGPIE_IMPLING_JAR, 1, 10)
                .add(NINJA_IMPLING_JAR, 1, 6)
                .add(DRAGON_IMPLING_JAR, 1, 2)
                .add(LUCKY_IMPLING_JAR, 1, 1),
        }
    }
}

impl Default for Implings {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for Implings {
    fn name(&self) -> &str {
        "Implings"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        // no wandering off inside the Inferno
        if ctx.activity.kind == ActivityKind::Inferno {
            return Ok(None);
        }

        let mut caught = Bank::new();
        for _ in 0..ctx.minutes() {
            if roll(ctx.rng, self.one_in_per_minute) {
                caught.add_bank(&self.table.roll(ctx.rng));
            }
        }
        if caught.is_empty() {
            return Ok(None);
        }

        ctx.messages.push(format!("Caught {caught} during your trip."));
        Ok(Some(EffectContribution::adding(caught)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::handlers::testing::{activity, actor, run};

    #[tokio::test]
    async fn long_trips_catch_implings() {
        let a = activity(ActivityKind::Hunter, 600);
        let who = actor(|p| p, Bank::new());
        let ran = run(&Implings::new(), &a, &who, None, 3).await;

        let caught = ran.added();
        assert!(!caught.is_empty());
        assert!(caught.iter().all(|(item, _)| item.to_string().ends_with("impling jar")));
        assert_eq!(ran.messages.len(), 1);
        assert!(ran.messages[0].starts_with("Caught "));
    }

    #[tokio::test]
    async fn zero_minute_trips_and_the_inferno_catch_nothing() {
        let who = actor(|p| p, Bank::new());
        let short = run(&Implings::new(), &activity(ActivityKind::Hunter, 0), &who, None, 3).await;
        assert!(matches!(short.result, Ok(None)));

        let inferno =
            run(&Implings::new(), &activity(ActivityKind::Inferno, 600), &who, None, 3).await;
        assert!(matches!(inferno.result, Ok(None)));
        assert!(inferno.messages.is_empty());
    }

    #[tokio::test]
    async fn catches_are_reproducible() {
        let a = activity(ActivityKind::Fishing, 120);
        let who = actor(|p| p, Bank::new());
        let first = run(&Implings::new(), &a, &who, None, 11).await;
        let second = run(&Implings::new(), &a, &who, None, 11).await;
        assert_eq!(first.added(), second.added());
        assert_eq!(first.messages, second.messages);
    }
}
