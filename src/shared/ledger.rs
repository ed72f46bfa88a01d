use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identity of a resource kind. Two kinds are the same resource when
/// their names match, which is what makes saved ledgers portable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKind(String);

impl ResourceKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Resource kind → count. Counts are unsigned, and `remove` refuses to take
/// more than is stored, so an entry can never go below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    entries: BTreeMap<ResourceKind, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` units of `kind`, creating the entry if needed.
    /// Adding zero is a no-op.
    pub fn add(&mut self, kind: &ResourceKind, amount: u32) {
        if amount == 0 {
            return;
        }
        let count = self.entries.entry(kind.clone()).or_insert(0);
        *count = count.saturating_add(amount);
    }

    /// Remove `amount` units of `kind`. Returns false without touching the
    /// ledger when the kind is unset or holds fewer than `amount` units.
    pub fn remove(&mut self, kind: &ResourceKind, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        match self.entries.get_mut(kind) {
            Some(count) if *count >= amount => {
                *count -= amount;
                true
            }
            _ => false,
        }
    }

    pub fn count(&self, kind: &ResourceKind) -> u32 {
        self.entries.get(kind).copied().unwrap_or(0)
    }

    pub fn has(&self, kind: &ResourceKind, amount: u32) -> bool {
        self.count(kind) >= amount
    }

    /// Overwrite the stored count for `kind`. Used when restoring saves.
    pub fn set(&mut self, kind: ResourceKind, amount: u32) {
        self.entries.insert(kind, amount);
    }

    /// Move one unit from `self` into `target`. Nothing changes when `self`
    /// has no unit of `kind` to give.
    pub fn transfer_unit(&mut self, target: &mut ResourceLedger, kind: &ResourceKind) -> bool {
        if !self.remove(kind, 1) {
            return false;
        }
        target.add(kind, 1);
        true
    }

    /// Entries with a positive count, in name order.
    pub fn positive(&self) -> impl Iterator<Item = (&ResourceKind, u32)> {
        self.entries
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| (kind, *count))
    }

    pub fn total(&self) -> u32 {
        self.entries.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.positive().next().is_none()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl FromIterator<(ResourceKind, u32)> for ResourceLedger {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, u32)>>(iter: I) -> Self {
        let mut ledger = ResourceLedger::new();
        for (kind, amount) in iter {
            ledger.add(&kind, amount);
        }
        ledger
    }
}
