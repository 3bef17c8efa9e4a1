//! Reconciliation plan
//!
//! Pure diff between the entries a set holds and the entries it should hold.
//! Both sides are keyed by entry `key`; attributes are compared after
//! defaults are filled in.

use crate::types::{DesiredEntry, RemoteEntry};
use indexmap::IndexMap;
use std::collections::HashSet;

/// An entry present on both sides whose attributes differ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate<'a> {
    /// Server id of the existing entry
    pub entry_id: &'a str,
    /// Target state
    pub desired: &'a DesiredEntry,
    /// Attribute names that differ
    pub changed: Vec<&'static str>,
}

/// Minimal set of actions bringing `current` to `desired`
///
/// `adds`, `updates` and `unchanged` follow desired order; `deletes` follows
/// current order. Every key of either side lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan<'a> {
    /// Desired keys absent remotely
    pub adds: Vec<&'a DesiredEntry>,
    /// Keys on both sides with differing attributes
    pub updates: Vec<PlannedUpdate<'a>>,
    /// Keys on both sides already in agreement
    pub unchanged: Vec<&'a str>,
    /// Remote keys no longer desired
    pub deletes: Vec<&'a RemoteEntry>,
}

impl<'a> ReconcilePlan<'a> {
    /// Diff current against desired
    #[must_use]
    pub fn compute(current: &'a [RemoteEntry], desired: &'a [DesiredEntry]) -> Self {
        let current_by_key: IndexMap<&str, &RemoteEntry> =
            current.iter().map(|entry| (entry.key.as_str(), entry)).collect();
        let desired_keys: HashSet<&str> = desired.iter().map(|entry| entry.key.as_str()).collect();

        let mut plan = Self::default();

        for wanted in desired {
            match current_by_key.get(wanted.key.as_str()).copied() {
                None => plan.adds.push(wanted),
                Some(existing) => {
                    let changed = wanted.attributes().changed_from(&existing.attributes());
                    if changed.is_empty() {
                        plan.unchanged.push(wanted.key.as_str());
                    } else {
                        plan.updates.push(PlannedUpdate {
                            entry_id: existing.id.as_str(),
                            desired: wanted,
                            changed,
                        });
                    }
                }
            }
        }

        plan.deletes = current_by_key
            .into_iter()
            .filter(|(key, _)| !desired_keys.contains(key))
            .map(|(_, entry)| entry)
            .collect();

        plan
    }

    /// No mutation required
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of mutating actions
    #[inline]
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.adds.len() + self.updates.len() + self.deletes.len()
    }

    /// Keys to add
    #[must_use]
    pub fn add_keys(&self) -> Vec<&'a str> {
        self.adds.iter().map(|entry| entry.key.as_str()).collect()
    }

    /// Keys to update
    #[must_use]
    pub fn update_keys(&self) -> Vec<&'a str> {
        self.updates.iter().map(|update| update.desired.key.as_str()).collect()
    }

    /// Keys to delete
    #[must_use]
    pub fn delete_keys(&self) -> Vec<&'a str> {
        self.deletes.iter().map(|entry| entry.key.as_str()).collect()
    }
}
