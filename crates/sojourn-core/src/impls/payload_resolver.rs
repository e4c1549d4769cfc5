//! PayloadResolver - reads the simulation result straight from the payload.
//!
//! Stands in for the per-activity simulation: whoever scheduled the activity
//! already stored its loot and description in the payload.
//!
//! ```json
//! { "description": "...", "loot": { "995": 100 }, "messages": ["..."] }
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Activity, Actor, Bank, ResolveError};
use crate::ports::{ActivityResolver, Resolution};

#[derive(Debug, Default, Deserialize)]
struct ResolvedPayload {
    description: Option<String>,
    loot: Option<Bank>,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadResolver;

impl PayloadResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityResolver for PayloadResolver {
    async fn resolve(
        &self,
        activity: &Activity,
        actor: &Actor,
    ) -> Result<Resolution, ResolveError> {
        let payload: ResolvedPayload = if activity.payload.is_null() {
            ResolvedPayload::default()
        } else {
            serde_json::from_value(activity.payload.clone()).map_err(|e| {
                ResolveError::InvalidPayload {
                    activity: activity.id,
                    reason: e.to_string(),
                }
            })?
        };

        let description = payload.description.unwrap_or_else(|| {
            format!(
                "{}'s minion finished a {:?} trip.",
                actor.profile.name, activity.kind
            )
        });
        let mut resolution = Resolution::new(description);
        if let Some(loot) = payload.loot {
            resolution = resolution.with_loot(loot);
        }
        resolution.messages = payload.messages;
        Ok(resolution)
    }
}
