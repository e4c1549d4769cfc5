//! NotificationDispatcher - builds the completion message and sends it
//!
//! # 流れ
//! 1. cancel the actor's previous collector
//! 2. content = description + message block + clue notices
//! 3. components from the final loot and the actor's tier and flags
//! 4. send; on success with components, open a new collector
//!
//! Transport problems never propagate: the activity is already processed by
//! the time anything is sent.

use serde::Serialize;
use std::sync::Arc;

use super::collector::CollectorManager;
use crate::domain::clue;
use crate::domain::items::SEED_PACK;
use crate::domain::{
    Activity, ActivityKind, Actor, ActorFlag, Attachment, Bank, Component, MessageRef,
    OutgoingMessage, PerkTier, TransportError,
};
use crate::ports::Transport;

/// Everything the processor hands over for one activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notification {
    pub description: String,
    pub attachment: Option<Attachment>,
    /// Pipeline messages, receipt and caller messages, in that order.
    pub messages: Vec<String>,
    /// Base loot plus everything the pipeline added.
    pub loot: Option<Bank>,
    pub extra_components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent(MessageRef),
    /// The destination is gone; the notification was dropped.
    UnusableDestination,
    Failed(String),
}

pub struct NotificationDispatcher {
    transport: Arc<dyn Transport>,
    collectors: Arc<CollectorManager>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn Transport>, collectors: Arc<CollectorManager>) -> Self {
        Self {
            transport,
            collectors,
        }
    }

    pub fn collectors(&self) -> &Arc<CollectorManager> {
        &self.collectors
    }

    pub async fn dispatch(
        &self,
        activity: &Activity,
        actor: &Actor,
        notification: Notification,
    ) -> DispatchOutcome {
        self.collectors.cancel(actor.id()).await;

        let loot = notification.loot.as_ref();
        let message = OutgoingMessage {
            content: render_content(
                &notification.description,
                &notification.messages,
                actor,
                loot,
            ),
            attachment: notification.attachment,
            components: components(activity, actor, loot, &notification.extra_components),
        };
        let has_components = !message.components.is_empty();

        match self.transport.send(activity.channel, message).await {
            Ok(reference) => {
                if has_components {
                    self.collectors.register(actor.id(), reference.clone()).await;
                }
                DispatchOutcome::Sent(reference)
            }
            Err(TransportError::UnusableDestination(destination)) => {
                tracing::debug!(
                    activity_id = %activity.id,
                    %destination,
                    "destination unusable, notification dropped"
                );
                DispatchOutcome::UnusableDestination
            }
            Err(err) => {
                tracing::warn!(activity_id = %activity.id, error = %err, "notification failed");
                DispatchOutcome::Failed(err.to_string())
            }
        }
    }
}

/// Message body: description, then the joined message block, then one line
/// per clue scroll for actors below tier two.
pub fn render_content(
    description: &str,
    messages: &[String],
    actor: &Actor,
    loot: Option<&Bank>,
) -> String {
    let mut content = description.to_string();
    if !messages.is_empty() {
        content.push_str("\n**Messages:** ");
        content.push_str(&messages.join(", "));
    }
    if actor.perk_tier() < PerkTier::Two
        && let Some(loot) = loot
    {
        for tier in clue::scrolls_in(loot) {
            content.push_str(&format!(
                "\n**You got a {} clue scroll** in your loot.",
                tier.name
            ));
        }
    }
    content
}

/// Interactive components in check order.
pub fn components(
    activity: &Activity,
    actor: &Actor,
    loot: Option<&Bank>,
    extra: &[Component],
) -> Vec<Component> {
    let mut components = vec![Component::RepeatTrip];

    if let Some(tier) = loot.and_then(clue::casket_in) {
        components.push(Component::OpenCasket {
            tier: tier.name.to_string(),
        });
    }

    if actor.perk_tier() > PerkTier::One {
        if let Some(loot) = loot {
            components.extend(clue::scrolls_in(loot).into_iter().map(|tier| {
                Component::DoClue {
                    tier: tier.name.to_string(),
                }
            }));
        }

        let profile = &actor.profile;
        if profile.birdhouse_ready && !actor.has_flag(ActorFlag::DisableBirdhouseRunButton) {
            components.push(Component::BirdhouseRun);
        }
        if profile.can_auto_contract && !actor.has_flag(ActorFlag::DisableAutoFarmContractButton)
        {
            components.push(Component::AutoFarmContract);
        }
        if !profile.has_slayer_task && activity.kind == ActivityKind::MonsterKilling {
            components.push(Component::NewSlayerTask);
        } else if !actor.has_flag(ActorFlag::DisableAutoSlayButton) {
            components.push(Component::AutoSlay);
        }
        if loot.is_some_and(|loot| loot.has(SEED_PACK)) {
            components.push(Component::OpenSeedPack);
        }
    }

    components.extend(extra.iter().cloned());
    components
}
