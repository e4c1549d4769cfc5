//! ActivityProcessor - one claimed activity, start to finish
//!
//! # 処理フロー
//! 1. actor snapshot (directory profile + ledger holdings)
//! 2. resolve: description and base loot from the upstream simulation
//! 3. run the effect pipeline (sequential, isolated, validated)
//! 4. one combined ledger apply, skipped when nothing changes
//! 5. dispatch the notification
//!
//! The claim happened before any of this; nothing here can un-complete an
//! activity. A crash between 4 and 5 leaves a processed but un-notified
//! activity.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use super::notification::{DispatchOutcome, Notification, NotificationDispatcher};
use crate::domain::{
    Activity, ActivityId, Actor, AggregatedOutcome, Bank, HandlerReport, LedgerError,
    ResolveError, StoreError,
};
use crate::pipeline::{Pipeline, PipelineRun};
use crate::ports::{ActivityResolver, ActorDirectory, Ledger};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// What happened to one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub activity: ActivityId,
    pub outcome: AggregatedOutcome,
    pub handlers: Vec<HandlerReport>,
    /// Whether the ledger was written.
    pub applied: bool,
    pub dispatch: DispatchOutcome,
}

pub struct ActivityProcessor {
    pipeline: Pipeline,
    ledger: Arc<dyn Ledger>,
    directory: Arc<dyn ActorDirectory>,
    resolver: Arc<dyn ActivityResolver>,
    dispatcher: NotificationDispatcher,
    rng_seed: Option<u64>,
}

impl ActivityProcessor {
    pub fn new(
        pipeline: Pipeline,
        ledger: Arc<dyn Ledger>,
        directory: Arc<dyn ActorDirectory>,
        resolver: Arc<dyn ActivityResolver>,
        dispatcher: NotificationDispatcher,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            pipeline,
            ledger,
            directory,
            resolver,
            dispatcher,
            rng_seed,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    /// The per-activity generator: derived from the seed and the activity id
    /// when a seed is configured, otherwise from entropy.
    pub fn rng_for(&self, activity: &Activity) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ activity.id.fold_u64()),
            None => StdRng::from_entropy(),
        }
    }

    #[tracing::instrument(
        name = "process_activity",
        skip_all,
        fields(activity_id = %activity.id, actor_id = %activity.owner, kind = ?activity.kind)
    )]
    pub async fn process(&self, activity: &Activity) -> Result<ProcessReport, ProcessError> {
        let profile = self.directory.profile(activity.owner).await?;
        let holdings = self.ledger.holdings(activity.owner).await?;
        let actor = Actor::new(profile, holdings);

        let resolution = self.resolver.resolve(activity, &actor).await?;

        let mut rng = self.rng_for(activity);
        let run = self
            .pipeline
            .run(activity, &actor, resolution.base_loot.as_ref(), &mut rng)
            .await;
        let (mut outcome, applied) = self.apply(&actor, &run).await?;
        if applied && !outcome.items_to_add.is_empty() {
            outcome
                .messages
                .push(format!("You received: {}", outcome.items_to_add));
        }

        let mut messages = outcome.messages.clone();
        messages.extend(resolution.messages.iter().cloned());
        let loot = resolution.base_loot.as_ref().map(|base| {
            let mut loot = base.clone();
            loot.add_bank(&outcome.items_to_add);
            loot
        });

        let dispatch = self
            .dispatcher
            .dispatch(
                activity,
                &actor,
                Notification {
                    description: resolution.description,
                    attachment: resolution.attachment,
                    messages,
                    loot,
                    extra_components: resolution.components,
                },
            )
            .await;

        tracing::debug!(applied, dispatch = ?dispatch, "activity processed");
        Ok(ProcessReport {
            activity: activity.id,
            outcome,
            handlers: run.reports,
            applied,
            dispatch,
        })
    }

    /// One combined ledger write. When the bank changed since the snapshot,
    /// the accepted contributions are re-checked against fresh holdings and
    /// the write is retried once without the ones that no longer fit.
    async fn apply(
        &self,
        actor: &Actor,
        run: &PipelineRun,
    ) -> Result<(AggregatedOutcome, bool), ProcessError> {
        let outcome = run.outcome.clone();
        if outcome.has_no_delta() {
            return Ok((outcome, false));
        }
        match self.transact(actor, &outcome).await? {
            None => return Ok((outcome, true)),
            Some(missing) => {
                tracing::debug!(%missing, "bank changed since the snapshot, revalidating");
            }
        }

        let holdings = self.ledger.holdings(actor.id()).await?;
        let mut outcome = run.revalidate(&holdings);
        if outcome.has_no_delta() {
            return Ok((outcome, false));
        }
        match self.transact(actor, &outcome).await? {
            None => Ok((outcome, true)),
            Some(missing) => {
                tracing::warn!(%missing, "trip effects not applied");
                outcome.messages.push(format!(
                    "Your trip effects could not be applied because your bank changed: you no longer have {missing}."
                ));
                Ok((outcome, false))
            }
        }
    }

    /// `Some(missing)` when the ledger refused the removals.
    async fn transact(
        &self,
        actor: &Actor,
        outcome: &AggregatedOutcome,
    ) -> Result<Option<Bank>, ProcessError> {
        match self
            .ledger
            .transact(actor.id(), &outcome.items_to_add, &outcome.items_to_remove)
            .await
        {
            Ok(()) => Ok(None),
            Err(LedgerError::InsufficientHoldings { missing, .. }) => Ok(Some(missing)),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CollectorManager;
    use crate::domain::items::{COINS, FIRE_RUNE, LOGS, MYSTERY_BOX};
    use crate::domain::{
        ActivityKind, ActorId, ActorProfile, Bank, ChannelId, EffectContribution, HandlerError,
        HandlerStatus,
    };
    use crate::impls::{InMemoryActorDirectory, InMemoryLedger, InMemoryTransport, PayloadResolver};
    use crate::pipeline::handlers::LootDoubling;
    use crate::pipeline::{EffectContext, EffectHandler, HandlerRegistry};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    struct Gives(&'static str, Bank);

    #[async_trait]
    impl EffectHandler for Gives {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            Ok(Some(EffectContribution::adding(self.1.clone())))
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl EffectHandler for AlwaysFails {
        fn name(&self) -> &str {
            "Always Fails"
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            Err(HandlerError::failed("nope"))
        }
    }

    struct Spends(Bank);

    #[async_trait]
    impl EffectHandler for Spends {
        fn name(&self) -> &str {
            "Spends"
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            Ok(Some(EffectContribution::default().with_removal(self.0.clone())))
        }
    }

    /// Spends the actor's whole bank behind the pipeline's back.
    struct EmptiesBank(InMemoryLedger, ActorId);

    #[async_trait]
    impl EffectHandler for EmptiesBank {
        fn name(&self) -> &str {
            "Empties Bank"
        }

        async fn run(
            &self,
            _ctx: &mut EffectContext<'_>,
        ) -> Result<Option<EffectContribution>, HandlerError> {
            self.0.set_bank(self.1, Bank::new()).await;
            Ok(None)
        }
    }

    /// Reports fixed holdings but refuses every removal.
    struct RefusingLedger(Bank);

    #[async_trait]
    impl Ledger for RefusingLedger {
        async fn holdings(&self, _actor: ActorId) -> Result<Bank, LedgerError> {
            Ok(self.0.clone())
        }

        async fn add(&self, _actor: ActorId, _items: &Bank) -> Result<(), LedgerError> {
            Ok(())
        }

        async fn remove(&self, actor: ActorId, items: &Bank) -> Result<(), LedgerError> {
            Err(LedgerError::InsufficientHoldings {
                actor,
                missing: items.clone(),
            })
        }

        async fn transact(
            &self,
            actor: ActorId,
            _add: &Bank,
            remove: &Bank,
        ) -> Result<(), LedgerError> {
            self.remove(actor, remove).await
        }
    }

    struct Harness {
        processor: ActivityProcessor,
        ledger: InMemoryLedger,
        transport: InMemoryTransport,
        actor: ActorId,
    }

    async fn harness(handlers: Vec<Arc<dyn EffectHandler>>, seed: u64) -> Harness {
        let ledger = InMemoryLedger::new();
        harness_on(ledger.clone(), Arc::new(ledger), ActorId::generate(), handlers, seed).await
    }

    /// `ledger` is what the processor writes to; `inspect` is kept for
    /// assertions.
    async fn harness_on(
        inspect: InMemoryLedger,
        ledger: Arc<dyn Ledger>,
        actor: ActorId,
        handlers: Vec<Arc<dyn EffectHandler>>,
        seed: u64,
    ) -> Harness {
        let mut registry = HandlerRegistry::new();
        for handler in handlers {
            registry.register(handler).unwrap();
        }
        let directory = InMemoryActorDirectory::new();
        let transport = InMemoryTransport::new();
        directory.upsert(ActorProfile::new(actor, "tester")).await;

        let processor = ActivityProcessor::new(
            Pipeline::new(Arc::new(registry), Duration::from_millis(500)),
            ledger,
            Arc::new(directory),
            Arc::new(PayloadResolver::new()),
            NotificationDispatcher::new(
                Arc::new(transport.clone()),
                Arc::new(CollectorManager::new(Duration::from_secs(60))),
            ),
            Some(seed),
        );
        Harness {
            processor,
            ledger: inspect,
            transport,
            actor,
        }
    }

    fn trip(owner: ActorId, loot: Option<Bank>) -> Activity {
        let payload = match loot {
            Some(loot) => serde_json::json!({ "description": "Trip done.", "loot": loot }),
            None => serde_json::json!({ "description": "Trip done." }),
        };
        Activity::new(
            crate::domain::ActivityId::generate(),
            owner,
            ActivityKind::MonsterKilling,
            ChannelId::generate(),
            Utc::now(),
            Duration::from_secs(45 * 60),
        )
        .with_payload(payload)
    }

    #[tokio::test]
    async fn applies_the_aggregate_once_and_notifies() {
        let h = harness(
            vec![
                Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
                Arc::new(AlwaysFails),
                Arc::new(Gives("Coins", Bank::new().with(COINS, 7))),
            ],
            1,
        )
        .await;

        let report = h.processor.process(&trip(h.actor, None)).await.unwrap();

        assert!(report.applied);
        assert_eq!(h.ledger.write_count(), 1);
        assert_eq!(
            h.ledger.holdings(h.actor).await.unwrap(),
            Bank::new().with(LOGS, 3).with(COINS, 7)
        );
        assert!(matches!(report.handlers[1].status, HandlerStatus::Failed(_)));
        assert_eq!(
            h.transport.sent().await[0].message.content,
            "Trip done.\n**Messages:** You received: 7x Coins, 3x Logs"
        );
    }

    #[tokio::test]
    async fn empty_aggregate_skips_the_ledger() {
        let h = harness(vec![Arc::new(AlwaysFails)], 1).await;

        let report = h.processor.process(&trip(h.actor, None)).await.unwrap();

        assert!(!report.applied);
        assert_eq!(h.ledger.write_count(), 0);
        assert_eq!(h.transport.sent().await[0].message.content, "Trip done.");
    }

    #[tokio::test]
    async fn unheld_removal_becomes_a_message() {
        let h = harness(vec![Arc::new(Spends(Bank::new().with(FIRE_RUNE, 5)))], 1).await;

        let report = h.processor.process(&trip(h.actor, None)).await.unwrap();

        assert!(!report.applied);
        assert_eq!(h.ledger.write_count(), 0);
        let content = &h.transport.sent().await[0].message.content;
        assert!(content.contains("Spends was skipped because you don't have 5x Fire rune."));
    }

    #[tokio::test]
    async fn seeded_doubling_adds_loot_and_a_mystery_box() {
        let base = Bank::new().with(COINS, 100);
        for seed in 0..500 {
            let h = harness(vec![Arc::new(LootDoubling::new())], seed).await;
            let report = h
                .processor
                .process(&trip(h.actor, Some(base.clone())))
                .await
                .unwrap();
            if !report.applied {
                continue;
            }

            let expected = Bank::new().with(COINS, 100).with(MYSTERY_BOX, 1);
            assert_eq!(report.outcome.items_to_add, expected);
            assert_eq!(h.ledger.holdings(h.actor).await.unwrap(), expected);
            return;
        }
        panic!("no seed in 0..500 doubled the loot");
    }

    #[tokio::test]
    async fn unusable_destination_still_applies_the_ledger() {
        let h = harness(vec![Arc::new(Gives("Coins", Bank::new().with(COINS, 1)))], 1).await;
        let activity = trip(h.actor, None);
        h.transport.mark_unusable(activity.channel).await;

        let report = h.processor.process(&activity).await.unwrap();

        assert_eq!(report.dispatch, DispatchOutcome::UnusableDestination);
        assert!(report.applied);
        assert_eq!(h.ledger.holdings(h.actor).await.unwrap().amount(COINS), 1);
    }

    #[tokio::test]
    async fn unknown_actor_is_an_error() {
        let h = harness(vec![], 1).await;
        let err = h
            .processor
            .process(&trip(ActorId::generate(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Store(StoreError::ActorNotFound(_))));
    }

    #[tokio::test]
    async fn same_seed_same_activity_same_outcome() {
        let h = harness(crate::pipeline::handlers::canonical(), 77).await;
        let activity = trip(h.actor, Some(Bank::new().with(COINS, 100)));

        let mut first = h.processor.rng_for(&activity);
        let mut second = h.processor.rng_for(&activity);
        let actor = Actor::new(ActorProfile::new(h.actor, "tester"), Bank::new());
        let base = Bank::new().with(COINS, 100);

        let a = h
            .processor
            .pipeline()
            .run(&activity, &actor, Some(&base), &mut first)
            .await;
        let b = h
            .processor
            .pipeline()
            .run(&activity, &actor, Some(&base), &mut second)
            .await;
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.loot, b.loot);
    }

    #[tokio::test]
    async fn bank_change_before_apply_drops_only_the_stale_removal() {
        let ledger = InMemoryLedger::new();
        let actor = ActorId::generate();
        ledger.set_bank(actor, Bank::new().with(FIRE_RUNE, 5)).await;
        let h = harness_on(
            ledger.clone(),
            Arc::new(ledger.clone()),
            actor,
            vec![
                Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
                Arc::new(Spends(Bank::new().with(FIRE_RUNE, 5))),
                Arc::new(EmptiesBank(ledger.clone(), actor)),
            ],
            1,
        )
        .await;

        let report = h.processor.process(&trip(actor, None)).await.unwrap();

        assert!(report.applied);
        assert_eq!(h.ledger.holdings(actor).await.unwrap(), Bank::new().with(LOGS, 3));
        assert_eq!(h.ledger.write_count(), 1);
        assert_eq!(
            h.transport.sent().await[0].message.content,
            "Trip done.\n**Messages:** Spends was skipped because you don't have 5x Fire rune., \
             You received: 3x Logs"
        );
    }

    #[tokio::test]
    async fn refused_apply_names_only_the_missing_items() {
        let actor = ActorId::generate();
        let runes = Bank::new().with(FIRE_RUNE, 5);
        let h = harness_on(
            InMemoryLedger::new(),
            Arc::new(RefusingLedger(runes.clone())),
            actor,
            vec![
                Arc::new(Gives("Logs", Bank::new().with(LOGS, 3))),
                Arc::new(Spends(runes)),
            ],
            1,
        )
        .await;

        let report = h.processor.process(&trip(actor, None)).await.unwrap();

        assert!(!report.applied);
        let content = &h.transport.sent().await[0].message.content;
        assert!(content.ends_with(
            "Your trip effects could not be applied because your bank changed: \
             you no longer have 5x Fire rune."
        ));
        assert!(!content.contains(&actor.to_string()));
        assert!(!content.contains("You received"));
    }
}
