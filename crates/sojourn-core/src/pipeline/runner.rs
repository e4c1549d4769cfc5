//! Pipeline - runs the registered handlers over one activity
//!
//! Strictly sequential. Each handler is timed, isolated (errors and panics
//! are caught) and validated (its removals must be covered by what the actor
//! will hold at that point). The result is one `AggregatedOutcome`; applying
//! it is the processor's job.

use futures::FutureExt;
use rand::rngs::StdRng;
use std::ops::Range;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::handler::{EffectContext, MessageSink};
use super::registry::HandlerRegistry;
use crate::domain::errors::panic_message;
use crate::domain::{
    Activity, Actor, AggregatedOutcome, Bank, EffectContribution, HandlerReport, HandlerStatus,
};

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Sum of accepted contributions plus the collected messages.
    pub outcome: AggregatedOutcome,
    /// Base loot plus every accepted addition.
    pub loot: Bank,
    pub reports: Vec<HandlerReport>,
    /// Accepted contributions in run order, for `revalidate`.
    pub accepted: Vec<AcceptedContribution>,
}

/// One contribution that passed validation, with the messages its handler
/// pushed (indices into `outcome.messages`).
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedContribution {
    pub handler: String,
    pub contribution: EffectContribution,
    pub messages: Range<usize>,
}

impl PipelineRun {
    /// Re-check the accepted contributions against fresh `holdings`.
    ///
    /// Contributions that no longer fit are dropped together with their
    /// messages, and a skip notice takes the place of those messages. The
    /// rest is re-aggregated in the original order.
    pub fn revalidate(&self, holdings: &Bank) -> AggregatedOutcome {
        let mut outcome = AggregatedOutcome::default();
        let mut running = holdings.clone();
        let mut skipped: Vec<(Range<usize>, String)> = Vec::new();

        for accepted in &self.accepted {
            let mut next = running.clone();
            next.add_bank(&accepted.contribution.items_to_add);
            match next.try_remove_bank(&accepted.contribution.items_to_remove) {
                Ok(()) => {
                    running = next;
                    outcome.absorb(&accepted.contribution);
                }
                Err(missing) => {
                    tracing::debug!(
                        handler = %accepted.handler,
                        %missing,
                        "contribution dropped on revalidation"
                    );
                    skipped.push((
                        accepted.messages.clone(),
                        skipped_message(&accepted.handler, &missing),
                    ));
                }
            }
        }

        let dropped: Vec<Range<usize>> = skipped.iter().map(|(range, _)| range.clone()).collect();
        let mut notices = skipped.into_iter().peekable();
        for (i, message) in self.outcome.messages.iter().enumerate() {
            while let Some((_, notice)) = notices.next_if(|(range, _)| range.start <= i) {
                outcome.messages.push(notice);
            }
            if !dropped.iter().any(|range| range.contains(&i)) {
                outcome.messages.push(message.clone());
            }
        }
        outcome.messages.extend(notices.map(|(_, notice)| notice));
        outcome
    }
}

fn skipped_message(handler: &str, missing: &Bank) -> String {
    format!("{handler} was skipped because you don't have {missing}.")
}

pub struct Pipeline {
    registry: Arc<HandlerRegistry>,
    budget: Duration,
}

impl Pipeline {
    pub fn new(registry: Arc<HandlerRegistry>, budget: Duration) -> Self {
        Self { registry, budget }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub async fn run(
        &self,
        activity: &Activity,
        actor: &Actor,
        base_loot: Option<&Bank>,
        rng: &mut StdRng,
    ) -> PipelineRun {
        let mut outcome = AggregatedOutcome::default();
        let mut sink = MessageSink::new();
        let mut loot = base_loot.cloned().unwrap_or_default();
        let mut holdings = actor.bank.clone();
        let mut reports = Vec::with_capacity(self.registry.len());
        let mut accepted = Vec::new();

        for handler in self.registry.iter() {
            let name = handler.name();
            let mark = sink.len();
            let started = Instant::now();

            let result = {
                let mut ctx = EffectContext {
                    activity,
                    actor,
                    base_loot,
                    loot: &loot,
                    holdings: &holdings,
                    messages: &mut sink,
                    rng: &mut *rng,
                };
                AssertUnwindSafe(handler.run(&mut ctx)).catch_unwind().await
            };

            let elapsed = started.elapsed();
            if elapsed > self.budget {
                tracing::warn!(
                    handler = name,
                    activity_id = %activity.id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "effect handler exceeded its budget"
                );
            }

            let status = match result {
                Ok(Ok(Some(contribution))) if !contribution.is_empty() => {
                    let mut next = holdings.clone();
                    next.add_bank(&contribution.items_to_add);
                    match next.try_remove_bank(&contribution.items_to_remove) {
                        Ok(()) => {
                            holdings = next;
                            loot.add_bank(&contribution.items_to_add);
                            outcome.absorb(&contribution);
                            accepted.push(AcceptedContribution {
                                handler: name.to_string(),
                                contribution,
                                messages: mark..sink.len(),
                            });
                            HandlerStatus::Contributed
                        }
                        Err(missing) => {
                            sink.truncate(mark);
                            sink.push(skipped_message(name, &missing));
                            tracing::debug!(
                                handler = name,
                                activity_id = %activity.id,
                                %missing,
                                "contribution rejected: insufficient holdings"
                            );
                            HandlerStatus::Rejected(missing)
                        }
                    }
                }
                Ok(Ok(_)) => HandlerStatus::NoEffect,
                Ok(Err(err)) => {
                    sink.truncate(mark);
                    tracing::error!(
                        handler = name,
                        activity_id = %activity.id,
                        error = %err,
                        "effect handler failed"
                    );
                    HandlerStatus::Failed(err.to_string())
                }
                Err(payload) => {
                    sink.truncate(mark);
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        handler = name,
                        activity_id = %activity.id,
                        panic = %message,
                        "effect handler panicked"
                    );
                    HandlerStatus::Failed(format!("panicked: {message}"))
                }
            };

            reports.push(HandlerReport {
                handler: name.to_string(),
                status,
                elapsed,
            });
        }

        outcome.messages = sink.into_vec();
        PipelineRun {
            outcome,
            loot,
            reports,
            accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::items::{COINS, FIRE_RUNE, LOGS, NATURE_RUNE};
    use crate::domain::{
        ActivityId, ActivityKind, ActorId, ActorProfile, ChannelId, EffectContribution,
        HandlerError,
    };
    use crate::pipeline::EffectHandler;
    use async_trait::async_trait;
    use chrono::Utc;
    use rand::{Rng, SeedableRng};

    /// Adds a fixed bank and says so.
    struct Gives(&'static str, Bank);

    #[async_trait]
    impl EffectHandler for Gives {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(
            &self,
            ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            ctx.messages.push(format!("{} gave {}", self.0, self.1));
            Ok(Some(EffectContribution::adding(self.1.clone())))
        }
    }

    /// Pushes a message, then errors.
    struct Fails;

    #[async_trait]
    impl EffectHandler for Fails {
        fn name(&self) -> &str {
            "Fails"
        }

        async fn run(
            &self,
            ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            ctx.messages.push("half-done");
            Err(HandlerError::failed("boom"))
        }
    }

    struct Panics;

    #[async_trait]
    impl EffectHandler for Panics {
        fn name(&self) -> &str {
            "Panics"
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            panic!("handler blew up");
        }
    }

    /// Removes a fixed bank without checking.
    struct Takes(Bank);

    #[async_trait]
    impl EffectHandler for Takes {
        fn name(&self) -> &str {
            "Takes"
        }

        async fn run(
            &self,
            ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            ctx.messages.push("took things");
            Ok(Some(
                EffectContribution::default().with_removal(self.0.clone()),
            ))
        }
    }

    /// Records how much loot it saw, adds a random amount of coins.
    struct Rolls;

    #[async_trait]
    impl EffectHandler for Rolls {
        fn name(&self) -> &str {
            "Rolls"
        }

        async fn run(
            &self,
            ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            ctx.messages.push(format!("saw {}", ctx.loot));
            let coins = ctx.rng.gen_range(1..1_000);
            Ok(Some(EffectContribution::adding(
                Bank::new().with(COINS, coins),
            )))
        }
    }

    fn pipeline(handlers: Vec<Arc<dyn EffectHandler>>) -> Pipeline {
        let mut registry = HandlerRegistry::new();
        for handler in handlers {
            registry.register(handler).unwrap();
        }
        Pipeline::new(Arc::new(registry), Duration::from_millis(500))
    }

    fn fixture(bank: Bank) -> (Activity, Actor) {
        let owner = ActorId::generate();
        let activity = Activity::new(
            ActivityId::generate(),
            owner,
            ActivityKind::Woodcutting,
            ChannelId::generate(),
            Utc::now(),
            Duration::from_secs(30 * 60),
        );
        (activity, Actor::new(ActorProfile::new(owner, "tester"), bank))
    }

    #[tokio::test]
    async fn failing_handler_does_not_block_neighbours() {
        let p = pipeline(vec![
            Arc::new(Gives("Before", Bank::new().with(LOGS, 1))),
            Arc::new(Fails),
            Arc::new(Panics),
            Arc::new(Gives("After", Bank::new().with(COINS, 5))),
        ]);
        let (activity, actor) = fixture(Bank::new());
        let run = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(
            run.outcome.items_to_add,
            Bank::new().with(LOGS, 1).with(COINS, 5)
        );
        assert_eq!(
            run.outcome.messages,
            vec!["Before gave 1x Logs".to_string(), "After gave 5x Coins".to_string()]
        );
        assert!(matches!(&run.reports[1].status, HandlerStatus::Failed(e) if e == "boom"));
        assert!(
            matches!(&run.reports[2].status, HandlerStatus::Failed(e) if e.contains("handler blew up"))
        );
        assert_eq!(run.reports[3].status, HandlerStatus::Contributed);
    }

    #[tokio::test]
    async fn removals_are_checked_against_running_holdings() {
        let p = pipeline(vec![
            Arc::new(Gives("Runes", Bank::new().with(NATURE_RUNE, 2))),
            Arc::new(Takes(Bank::new().with(NATURE_RUNE, 3))),
        ]);
        let (activity, actor) = fixture(Bank::new().with(NATURE_RUNE, 1));
        let run = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(1))
            .await;

        // 1 held + 2 given covers the 3 taken
        assert_eq!(run.reports[1].status, HandlerStatus::Contributed);
        assert_eq!(run.outcome.items_to_remove, Bank::new().with(NATURE_RUNE, 3));
    }

    #[tokio::test]
    async fn unheld_removal_is_rejected_with_a_message() {
        let p = pipeline(vec![Arc::new(Takes(Bank::new().with(FIRE_RUNE, 10)))]);
        let (activity, actor) = fixture(Bank::new().with(FIRE_RUNE, 4));
        let run = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(1))
            .await;

        assert!(run.outcome.has_no_delta());
        assert_eq!(
            run.reports[0].status,
            HandlerStatus::Rejected(Bank::new().with(FIRE_RUNE, 6))
        );
        assert_eq!(
            run.outcome.messages,
            vec!["Takes was skipped because you don't have 6x Fire rune.".to_string()]
        );
    }

    #[tokio::test]
    async fn handlers_see_cumulative_loot() {
        let p = pipeline(vec![
            Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
            Arc::new(Rolls),
        ]);
        let (activity, actor) = fixture(Bank::new());
        let base = Bank::new().with(COINS, 100);
        let run = p
            .run(&activity, &actor, Some(&base), &mut StdRng::seed_from_u64(9))
            .await;

        assert_eq!(run.outcome.messages[1], "saw 100x Coins, 3x Logs");
        assert_eq!(run.loot.amount(LOGS), 3);
        assert!(run.loot.amount(COINS) > 100);
    }

    #[tokio::test]
    async fn same_seed_same_outcome() {
        let p = pipeline(vec![Arc::new(Rolls)]);
        let (activity, actor) = fixture(Bank::new());

        let a = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(42))
            .await;
        let b = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(42))
            .await;
        assert_eq!(a.outcome, b.outcome);
    }

    #[tokio::test]
    async fn revalidate_drops_only_what_no_longer_fits() {
        let p = pipeline(vec![
            Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
            Arc::new(Takes(Bank::new().with(FIRE_RUNE, 5))),
            Arc::new(Gives("Coins", Bank::new().with(COINS, 7))),
        ]);
        let (activity, actor) = fixture(Bank::new().with(FIRE_RUNE, 5));
        let run = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(1))
            .await;
        assert_eq!(run.accepted.len(), 3);
        assert_eq!(run.accepted[1].messages, 1..2);

        // the runes were spent elsewhere in the meantime
        let outcome = run.revalidate(&Bank::new().with(FIRE_RUNE, 2));

        assert_eq!(
            outcome.items_to_add,
            Bank::new().with(LOGS, 3).with(COINS, 7)
        );
        assert!(outcome.items_to_remove.is_empty());
        assert_eq!(
            outcome.messages,
            vec![
                "Logs gave 3x Logs".to_string(),
                "Takes was skipped because you don't have 3x Fire rune.".to_string(),
                "Coins gave 7x Coins".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn revalidate_against_unchanged_holdings_is_identity() {
        let p = pipeline(vec![
            Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
            Arc::new(Fails),
            Arc::new(Takes(Bank::new().with(FIRE_RUNE, 1))),
        ]);
        let (activity, actor) = fixture(Bank::new().with(FIRE_RUNE, 1));
        let run = p
            .run(&activity, &actor, None, &mut StdRng::seed_from_u64(1))
            .await;

        assert_eq!(run.revalidate(&actor.bank), run.outcome);
    }
}
