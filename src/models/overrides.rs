//! Manual override layer.
//!
//! Persisted per-(flight, date) tail assignments that take absolute
//! precedence over every engine. The engines read the merged view only and
//! never write to this layer; commits happen through the persistence
//! collaborator after a human or engine decision.
//!
//! Local edits made ahead of a server round-trip are tracked as two pending
//! sets (adds and removals) and reconciled against each authoritative
//! refresh.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{FlightKey, FlightLeg};

/// The persisted override map plus optimistic pending edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualOverrides {
    /// Authoritative (flight, date) → registration pins.
    committed: HashMap<FlightKey, String>,
    /// Locally staged pins not yet confirmed by the persistence layer.
    pending_add: HashMap<FlightKey, String>,
    /// Locally staged removals not yet confirmed.
    pending_remove: HashSet<FlightKey>,
}

impl ManualOverrides {
    /// Creates an empty override layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seeds an authoritative pin.
    pub fn with_pin(mut self, key: FlightKey, registration: impl Into<String>) -> Self {
        self.committed.insert(key, registration.into());
        self
    }

    /// Stages a pin ahead of persistence. Staging the same pin twice is a
    /// no-op, so retries are safe.
    pub fn stage_add(&mut self, key: FlightKey, registration: impl Into<String>) {
        self.pending_remove.remove(&key);
        self.pending_add.insert(key, registration.into());
    }

    /// Stages a removal ahead of persistence. Idempotent under retry.
    pub fn stage_remove(&mut self, key: FlightKey) {
        self.pending_add.remove(&key);
        self.pending_remove.insert(key);
    }

    /// Replaces the authoritative map with a server refresh and drops
    /// pending edits the refresh already reflects.
    pub fn reconcile(&mut self, authoritative: HashMap<FlightKey, String>) {
        self.committed = authoritative;
        let committed = &self.committed;
        self.pending_add
            .retain(|key, reg| committed.get(key) != Some(reg));
        self.pending_remove.retain(|key| committed.contains_key(key));
    }

    /// The effective pin for a flight instance: pending removal wins, then
    /// pending add, then the authoritative map.
    pub fn pinned(&self, key: &FlightKey) -> Option<&str> {
        if self.pending_remove.contains(key) {
            return None;
        }
        self.pending_add
            .get(key)
            .or_else(|| self.committed.get(key))
            .map(String::as_str)
    }

    /// The effective pin for a leg, falling back to the registration the
    /// schedule provider already merged onto the leg.
    pub fn effective_pin(&self, leg: &FlightLeg) -> Option<String> {
        let key = leg.key();
        if self.pending_remove.contains(&key) {
            return None;
        }
        self.pinned(&key)
            .map(str::to_string)
            .or_else(|| leg.pinned_registration.clone())
    }

    /// Copies effective pins onto a set of legs, producing the resolved
    /// view the engines consume.
    pub fn merge_onto(&self, legs: &mut [FlightLeg]) {
        for leg in legs.iter_mut() {
            leg.pinned_registration = self.effective_pin(leg);
        }
    }

    /// Number of effective pins across committed and pending state.
    pub fn len(&self) -> usize {
        let mut keys: HashSet<&FlightKey> = self.committed.keys().collect();
        keys.extend(self.pending_add.keys());
        keys.retain(|k| !self.pending_remove.contains(*k));
        keys.len()
    }

    /// Whether no pins are in effect.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
