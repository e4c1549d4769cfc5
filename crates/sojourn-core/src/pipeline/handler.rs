//! EffectHandler trait - one stage of the completion pipeline
//!
//! # 学習ポイント
//! - Object-safe async trait (`Arc<dyn EffectHandler>` in an ordered list)
//! - Borrowed context: handlers see the activity, the actor snapshot and the
//!   running loot, but only the pipeline owns them
//! - Append-only message sink (handlers can push, never edit or remove)

use async_trait::async_trait;
use rand::rngs::StdRng;

use crate::domain::{Activity, Actor, Bank, EffectContribution, HandlerError};

/// Ordered list of user-facing lines collected during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSink {
    messages: Vec<String>,
}

impl MessageSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop everything pushed after `len` (a failed handler's partial output).
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }
}

/// Everything a handler may look at while it runs.
///
/// - `base_loot`: what the upstream simulation produced, if anything
/// - `loot`: base loot plus every contribution accepted so far
/// - `holdings`: what the actor will hold once earlier contributions apply
/// - `rng`: the per-activity generator; use it for every roll so runs are
///   reproducible under a fixed seed
pub struct EffectContext<'a> {
    pub activity: &'a Activity,
    pub actor: &'a Actor,
    pub base_loot: Option<&'a Bank>,
    pub loot: &'a Bank,
    pub holdings: &'a Bank,
    pub messages: &'a mut MessageSink,
    pub rng: &'a mut StdRng,
}

impl EffectContext<'_> {
    /// Trip length in whole minutes.
    pub fn minutes(&self) -> u64 {
        self.activity.minutes()
    }
}

/// One pipeline stage.
///
/// # 契約
/// - `name` is only used for logging and duplicate detection
/// - `Ok(None)` and an empty contribution both mean "no effect"
/// - an `Err` (or a panic) discards the contribution and any messages the
///   handler pushed; the pipeline carries on with the next handler
/// - removals of items the actor would not hold are rejected by the
///   pipeline; handlers that remove items should check `holdings` first and
///   explain themselves with a message instead
#[async_trait]
pub trait EffectHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        ctx: &mut EffectContext<'_>,
    ) -> Result<Option<EffectContribution>, HandlerError>;
}
