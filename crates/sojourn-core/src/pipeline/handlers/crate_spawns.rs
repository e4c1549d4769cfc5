//! Crate spawns: a chance per hour of trip time to find the current event
//! crate.

use async_trait::async_trait;

use crate::domain::items::{ItemId, SPOOKY_CRATE};
use crate::domain::loot::per_hour_chance;
use crate::domain::{Bank, EffectContribution, HandlerError};
use crate::pipeline::{EffectContext, EffectHandler};

pub struct CrateSpawns {
    crate_item: ItemId,
    per_hour: f64,
}

impl CrateSpawns {
    pub fn new() -> Self {
        Self::with_crate(SPOOKY_CRATE, 0.25)
    }

    pub fn with_crate(crate_item: ItemId, per_hour: f64) -> Self {
        Self {
            crate_item,
            per_hour,
        }
    }
}

impl Default for CrateSpawns {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for CrateSpawns {
    fn name(&self) -> &str {
        "Crate Spawns"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let minutes = ctx.minutes();
        if minutes == 0 || !per_hour_chance(ctx.rng, minutes, self.per_hour) {
            return Ok(None);
        }
        Ok(Some(EffectContribution::adding(
            Bank::new().with(self.crate_item, 1),
        )))
    }
}
