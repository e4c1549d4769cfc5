//! Structural contract of an outgoing completion notification.
//!
//! Rendering (embeds, buttons, images) is the transport's business; here a
//! notification is text, an optional attachment and an ordered list of
//! interactive components.

use serde::{Deserialize, Serialize};

/// Interactive follow-up action offered with a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Component {
    RepeatTrip,
    /// Claim the reward casket of a clue tier found in the loot.
    OpenCasket { tier: String },
    DoClue { tier: String },
    BirdhouseRun,
    AutoFarmContract,
    NewSlayerTask,
    AutoSlay,
    OpenSeedPack,
    /// Supplied by the caller (activity-specific).
    Custom { id: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

/// Transport-assigned reference to a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRef(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_serialize_with_action_tag() {
        let v = serde_json::to_value(Component::OpenCasket {
            tier: "Elite".into(),
        })
        .unwrap();
        assert_eq!(v, serde_json::json!({ "action": "open_casket", "tier": "Elite" }));
        let v = serde_json::to_value(Component::RepeatTrip).unwrap();
        assert_eq!(v, serde_json::json!({ "action": "repeat_trip" }));
    }
}
