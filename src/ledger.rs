//! Per-node resource ledger.
//!
//! The ledger only stores amounts; callers decide how deltas are clamped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Amount and capacity of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub amount: f32,
    pub capacity: f32,
}

/// Named resources held by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    entries: BTreeMap<String, ResourceAmount>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`ResourceLedger::insert`].
    pub fn with_resource(mut self, key: impl Into<String>, amount: f32, capacity: f32) -> Self {
        self.insert(key, amount, capacity);
        self
    }

    /// Adds or replaces a resource entry.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is negative or `amount` lies outside `[0, capacity]`.
    pub fn insert(&mut self, key: impl Into<String>, amount: f32, capacity: f32) {
        assert!(capacity >= 0.0, "resource capacity must be >= 0");
        assert!(
            (0.0..=capacity).contains(&amount),
            "resource amount must be within [0, capacity]"
        );
        self.entries
            .insert(key.into(), ResourceAmount { amount, capacity });
    }

    pub fn get(&self, key: &str) -> Option<ResourceAmount> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Overwrites the stored amount of `key`. Returns `None` if the key is
    /// unknown.
    pub fn set_amount(&mut self, key: &str, amount: f32) -> Option<()> {
        let entry = self.entries.get_mut(key)?;
        entry.amount = amount;
        Some(())
    }

    /// Removes `key`, returning its last amount.
    pub fn remove(&mut self, key: &str) -> Option<ResourceAmount> {
        self.entries.remove(key)
    }
}
