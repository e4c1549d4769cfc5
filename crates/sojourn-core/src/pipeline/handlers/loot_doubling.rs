//! Loot doubling: a lucky trip gets its whole loot again plus a mystery box.
//!
//! Runs last so "whole loot" includes what earlier handlers added.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::items::{MR_E, MYSTERY_BOX};
use crate::domain::loot::roll;
use crate::domain::{EffectContribution, HandlerError};
use crate::pipeline::{EffectContext, EffectHandler};

pub struct LootDoubling {
    one_in: u32,
    one_in_with_mr_e: u32,
    min_duration: Duration,
}

impl LootDoubling {
    pub fn new() -> Self {
        Self {
            one_in: 15,
            one_in_with_mr_e: 12,
            min_duration: Duration::from_secs(20 * 60),
        }
    }
}

impl Default for LootDoubling {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for LootDoubling {
    fn name(&self) -> &str {
        "Loot Doubling"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        let activity = ctx.activity;
        if ctx.base_loot.is_none()
            || activity.cant_be_doubled()
            || !activity.kind.can_be_doubled()
            || activity.duration() <= self.min_duration
        {
            return Ok(None);
        }

        let odds = if ctx.actor.uses_pet(MR_E) {
            self.one_in_with_mr_e
        } else {
            self.one_in
        };
        if !roll(ctx.rng, odds) {
            return Ok(None);
        }

        let mut bonus = ctx.loot.clone();
        bonus.add(MYSTERY_BOX, 1);
        Ok(Some(EffectContribution::adding(bonus)))
    }
}
