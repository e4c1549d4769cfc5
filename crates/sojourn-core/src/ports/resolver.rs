//! ActivityResolver port - the upstream simulation of a finished activity.
//!
//! The loot simulation of each activity type is not part of this crate. The
//! resolver is the seam where it plugs in: it turns a claimed activity into a
//! description and the base loot the effect pipeline starts from.

use async_trait::async_trait;

use crate::domain::{Activity, Actor, Attachment, Bank, Component, ResolveError};

/// What the simulation produced for one activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Base text of the notification.
    pub description: String,

    /// Loot already granted by the simulation. Opaque to the pipeline
    /// except as input to handlers and component rules.
    pub base_loot: Option<Bank>,

    pub attachment: Option<Attachment>,

    /// Appended after the pipeline's own messages.
    pub messages: Vec<String>,

    /// Appended after the dispatcher's own components.
    pub components: Vec<Component>,
}

impl Resolution {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_loot(mut self, loot: Bank) -> Self {
        self.base_loot = Some(loot);
        self
    }
}

#[async_trait]
pub trait ActivityResolver: Send + Sync {
    async fn resolve(&self, activity: &Activity, actor: &Actor)
    -> Result<Resolution, ResolveError>;
}
