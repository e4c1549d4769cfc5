//! Message in a bottle: underwater trips have a 1/500 chance of one.

use async_trait::async_trait;

use crate::domain::items::MESSAGE_IN_A_BOTTLE;
use crate::domain::loot::roll;
use crate::domain::{Bank, EffectContribution, HandlerError};
use crate::pipeline::{EffectContext, EffectHandler};

pub struct MessageInABottle {
    one_in: u32,
}

impl MessageInABottle {
    pub fn new() -> Self {
        Self { one_in: 500 }
    }
}

impl Default for MessageInABottle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EffectHandler for MessageInABottle {
    fn name(&self) -> &str {
        "Message in a Bottle"
    }

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError> {
        if !ctx.activity.kind.is_underwater() || !roll(ctx.rng, self.one_in) {
            return Ok(None);
        }
        ctx.messages.push("You found a message in a bottle!");
        Ok(Some(EffectContribution::adding(
            Bank::new().with(MESSAGE_IN_A_BOTTLE, 1),
        )))
    }
}
