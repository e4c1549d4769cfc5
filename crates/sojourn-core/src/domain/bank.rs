//! Bank: a multiset of items (item id -> quantity).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::items::ItemId;

/// A collection of items with quantities.
///
/// Backed by a `BTreeMap` so iteration, `Display` and serialization are
/// deterministic, which the pipeline relies on for reproducible outcomes.
/// Zero quantities are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bank {
    #[serde(deserialize_with = "deserialize_items")]
    items: BTreeMap<ItemId, u64>,
}

impl Bank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add.
    pub fn with(mut self, item: ItemId, quantity: u64) -> Self {
        self.add(item, quantity);
        self
    }

    pub fn add(&mut self, item: ItemId, quantity: u64) -> &mut Self {
        if quantity > 0 {
            let held = self.items.entry(item).or_insert(0);
            *held = held.saturating_add(quantity);
        }
        self
    }

    pub fn add_bank(&mut self, other: &Bank) -> &mut Self {
        for (&item, &quantity) in &other.items {
            self.add(item, quantity);
        }
        self
    }

    /// Remove up to `quantity` of `item`, saturating at zero.
    pub fn remove(&mut self, item: ItemId, quantity: u64) -> &mut Self {
        if let Some(held) = self.items.get_mut(&item) {
            *held = held.saturating_sub(quantity);
            if *held == 0 {
                self.items.remove(&item);
            }
        }
        self
    }

    /// Remove every item of `other`, or nothing at all.
    ///
    /// On failure the bank is untouched and the error carries what was missing.
    pub fn try_remove_bank(&mut self, other: &Bank) -> Result<(), Bank> {
        let missing = self.missing(other);
        if !missing.is_empty() {
            return Err(missing);
        }
        for (&item, &quantity) in &other.items {
            self.remove(item, quantity);
        }
        Ok(())
    }

    pub fn amount(&self, item: ItemId) -> u64 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    pub fn has(&self, item: ItemId) -> bool {
        self.amount(item) > 0
    }

    /// Does this bank hold at least everything in `other`?
    pub fn contains_all(&self, other: &Bank) -> bool {
        self.missing(other).is_empty()
    }

    /// The part of `other` this bank cannot cover.
    pub fn missing(&self, other: &Bank) -> Bank {
        other
            .items
            .iter()
            .filter_map(|(&item, &wanted)| {
                let held = self.amount(item);
                (held < wanted).then_some((item, wanted - held))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u64)> + '_ {
        self.items.iter().map(|(&item, &quantity)| (item, quantity))
    }
}

impl FromIterator<(ItemId, u64)> for Bank {
    fn from_iter<I: IntoIterator<Item = (ItemId, u64)>>(iter: I) -> Self {
        let mut bank = Bank::new();
        for (item, quantity) in iter {
            bank.add(item, quantity);
        }
        bank
    }
}

/// Goes through `add`, so zero quantities are dropped on the way in.
fn deserialize_items<'de, D>(deserializer: D) -> Result<BTreeMap<ItemId, u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<ItemId, u64>::deserialize(deserializer)?;
    Ok(raw.into_iter().collect::<Bank>().items)
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No items");
        }
        let mut first = true;
        for (item, quantity) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{quantity}x {item}")?;
        }
        Ok(())
    }
}
