//! Clue tiers: the scroll and reward-casket ids the dispatcher looks for in loot.

use serde::Serialize;

use super::bank::Bank;
use super::items::{self, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClueTier {
    pub name: &'static str,
    pub casket: ItemId,
    pub scroll: ItemId,
}

pub const CLUE_TIERS: [ClueTier; 7] = [
    ClueTier {
        name: "Beginner",
        casket: items::REWARD_CASKET_BEGINNER,
        scroll: items::CLUE_SCROLL_BEGINNER,
    },
    ClueTier {
        name: "Easy",
        casket: items::REWARD_CASKET_EASY,
        scroll: items::CLUE_SCROLL_EASY,
    },
    ClueTier {
        name: "Medium",
        casket: items::REWARD_CASKET_MEDIUM,
        scroll: items::CLUE_SCROLL_MEDIUM,
    },
    ClueTier {
        name: "Hard",
        casket: items::REWARD_CASKET_HARD,
        scroll: items::CLUE_SCROLL_HARD,
    },
    ClueTier {
        name: "Elite",
        casket: items::REWARD_CASKET_ELITE,
        scroll: items::CLUE_SCROLL_ELITE,
    },
    ClueTier {
        name: "Master",
        casket: items::REWARD_CASKET_MASTER,
        scroll: items::CLUE_SCROLL_MASTER,
    },
    ClueTier {
        name: "Grandmaster",
        casket: items::REWARD_CASKET_GRANDMASTER,
        scroll: items::CLUE_SCROLL_GRANDMASTER,
    },
];

/// Tiers whose scroll appears in `loot`, in tier order.
pub fn scrolls_in(loot: &Bank) -> Vec<&'static ClueTier> {
    CLUE_TIERS.iter().filter(|tier| loot.has(tier.scroll)).collect()
}

/// First tier whose reward casket appears in `loot`.
pub fn casket_in(loot: &Bank) -> Option<&'static ClueTier> {
    CLUE_TIERS.iter().find(|tier| loot.has(tier.casket))
}
