//! Item identifiers and the small built-in item catalog.
//!
//! The full item database belongs to the game data layer; this module only
//! knows the items the completion pipeline itself refers to, so that banks can
//! be rendered with names and handlers can use named constants instead of raw
//! numbers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric identifier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    pub fn name(self) -> Option<&'static str> {
        CATALOG.iter().find(|def| def.id == self).map(|def| def.name)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Item #{}", self.0),
        }
    }
}

/// Case-insensitive lookup by item name.
pub fn item_id(name: &str) -> Option<ItemId> {
    CATALOG
        .iter()
        .find(|def| def.name.eq_ignore_ascii_case(name))
        .map(|def| def.id)
}

struct ItemDef {
    id: ItemId,
    name: &'static str,
}

macro_rules! catalog {
    ($($konst:ident = $id:literal => $name:literal,)*) => {
        $(pub const $konst: ItemId = ItemId($id);)*

        static CATALOG: &[ItemDef] = &[
            $(ItemDef { id: ItemId($id), name: $name },)*
        ];
    };
}

catalog! {
    COINS = 995 => "Coins",

    FIRE_RUNE = 554 => "Fire rune",
    WATER_RUNE = 555 => "Water rune",
    AIR_RUNE = 556 => "Air rune",
    EARTH_RUNE = 557 => "Earth rune",
    DEATH_RUNE = 560 => "Death rune",
    NATURE_RUNE = 561 => "Nature rune",
    LAW_RUNE = 563 => "Law rune",
    BLOOD_RUNE = 565 => "Blood rune",

    LOGS = 1511 => "Logs",
    MAGIC_LOGS = 1513 => "Magic logs",
    YEW_LOGS = 1515 => "Yew logs",
    MAPLE_LOGS = 1517 => "Maple logs",
    WILLOW_LOGS = 1519 => "Willow logs",
    OAK_LOGS = 1521 => "Oak logs",

    IRON_ORE = 440 => "Iron ore",
    MITHRIL_ORE = 447 => "Mithril ore",
    ADAMANTITE_ORE = 449 => "Adamantite ore",
    RUNITE_ORE = 451 => "Runite ore",
    COAL = 453 => "Coal",

    UNCUT_DIAMOND = 1617 => "Uncut diamond",
    UNCUT_RUBY = 1619 => "Uncut ruby",
    UNCUT_EMERALD = 1621 => "Uncut emerald",
    UNCUT_SAPPHIRE = 1623 => "Uncut sapphire",

    RANARR_SEED = 5295 => "Ranarr seed",
    TOADFLAX_SEED = 5296 => "Toadflax seed",
    SNAPDRAGON_SEED = 5300 => "Snapdragon seed",
    POTATO_SEED = 5318 => "Potato seed",
    WATERMELON_SEED = 5321 => "Watermelon seed",
    SEED_PACK = 22993 => "Seed pack",

    BANANA = 1963 => "Banana",
    LAMP = 2528 => "Lamp",
    MORT_MYRE_FUNGUS = 2970 => "Mort myre fungus",
    MIME_MASK = 3057 => "Mime mask",
    FROG_TOKEN = 6183 => "Frog token",
    MYSTERY_BOX = 6199 => "Mystery box",
    BAGUETTE = 6961 => "Baguette",

    YEW_LONGBOW = 855 => "Yew longbow",
    MAGIC_LONGBOW = 859 => "Magic longbow",
    RUNE_PLATEBODY = 1127 => "Rune platebody",

    BABY_IMPLING_JAR = 11238 => "Baby impling jar",
    YOUNG_IMPLING_JAR = 11240 => "Young impling jar",
    GOURMET_IMPLING_JAR = 11242 => "Gourmet impling jar",
    EARTH_IMPLING_JAR = 11244 => "Earth impling jar",
    ESSENCE_IMPLING_JAR = 11246 => "Essence impling jar",
    ECLECTIC_IMPLING_JAR = 11248 => "Eclectic impling jar",
    NATURE_IMPLING_JAR = 11250 => "Nature impling jar",
    MAGPIE_IMPLING_JAR = 11252 => "Magpie impling jar",
    NINJA_IMPLING_JAR = 11254 => "Ninja impling jar",
    DRAGON_IMPLING_JAR = 11256 => "Dragon impling jar",
    LUCKY_IMPLING_JAR = 19732 => "Lucky impling jar",

    CLUE_SCROLL_BEGINNER = 23182 => "Clue scroll (beginner)",
    REWARD_CASKET_BEGINNER = 23245 => "Reward casket (beginner)",
    CLUE_SCROLL_EASY = 2677 => "Clue scroll (easy)",
    REWARD_CASKET_EASY = 20546 => "Reward casket (easy)",
    CLUE_SCROLL_MEDIUM = 2801 => "Clue scroll (medium)",
    REWARD_CASKET_MEDIUM = 20545 => "Reward casket (medium)",
    CLUE_SCROLL_HARD = 2722 => "Clue scroll (hard)",
    REWARD_CASKET_HARD = 20544 => "Reward casket (hard)",
    CLUE_SCROLL_ELITE = 12073 => "Clue scroll (elite)",
    REWARD_CASKET_ELITE = 20543 => "Reward casket (elite)",
    CLUE_SCROLL_MASTER = 19835 => "Clue scroll (master)",
    REWARD_CASKET_MASTER = 19836 => "Reward casket (master)",
    CLUE_SCROLL_GRANDMASTER = 19837 => "Clue scroll (grandmaster)",
    REWARD_CASKET_GRANDMASTER = 19838 => "Reward casket (grandmaster)",

    MESSAGE_IN_A_BOTTLE = 70000 => "Message in a bottle",
    SPOOKY_CRATE = 70001 => "Spooky crate",
    FESTIVE_CRATE = 70002 => "Festive crate",
    MUTATED_ZYGOMITE_SEED = 70003 => "Mutated zygomite seed",
    MOONLIGHT_MUTATOR = 70004 => "Moonlight mutator",
    MAGIC_MASTER_CAPE = 70005 => "Magic master cape",

    PEKY = 70100 => "Peky",
    OBIS = 70101 => "Obis",
    BROCK = 70102 => "Brock",
    WILVUS = 70103 => "Wilvus",
    SMOKEY = 70104 => "Smokey",
    DOUG = 70105 => "Doug",
    HARRY = 70106 => "Harry",
    MR_E = 70107 => "Mr. E",
    VOIDLING = 70108 => "Voidling",
}

/// High-alchemy value in coins, for items the alching handler may cast on.
pub fn alch_value(id: ItemId) -> Option<u64> {
    match id {
        YEW_LONGBOW => Some(768),
        MAGIC_LONGBOW => Some(1_536),
        RUNE_PLATEBODY => Some(39_000),
        _ => None,
    }
}
