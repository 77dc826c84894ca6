//! Per-tail leg timelines.
//!
//! Engine-internal index of which legs sit on which tail, kept sorted by
//! departure so neighbor and overlap queries stay cheap during the
//! constructor sweep and the refiner's move evaluation.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::{FlightKey, FlightLeg};

/// Sorted per-registration leg lists over one borrowed set of legs.
#[derive(Debug, Default)]
pub(crate) struct Timelines<'a> {
    by_registration: HashMap<String, Vec<&'a FlightLeg>>,
}

impl<'a> Timelines<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds timelines from an existing assignment map.
    pub fn from_assignments(
        legs: &'a [FlightLeg],
        assignments: &HashMap<FlightKey, String>,
    ) -> Self {
        let mut timelines = Self::new();
        for leg in legs {
            if let Some(registration) = assignments.get(&leg.key()) {
                timelines.insert(registration, leg);
            }
        }
        timelines
    }

    /// Inserts a leg into a tail's timeline, keeping departure order.
    pub fn insert(&mut self, registration: &str, leg: &'a FlightLeg) {
        let legs = self
            .by_registration
            .entry(registration.to_string())
            .or_default();
        let at = legs
            .partition_point(|existing| existing.departure_instant() <= leg.departure_instant());
        legs.insert(at, leg);
    }

    /// Removes a flight instance from a tail's timeline.
    pub fn remove(&mut self, registration: &str, key: &FlightKey) {
        if let Some(legs) = self.by_registration.get_mut(registration) {
            legs.retain(|leg| leg.key() != *key);
        }
    }

    /// The legs on a tail, in departure order.
    pub fn legs(&self, registration: &str) -> &[&'a FlightLeg] {
        self.by_registration
            .get(registration)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registrations with at least one leg.
    pub fn used_registrations(&self) -> impl Iterator<Item = &str> {
        self.by_registration
            .iter()
            .filter(|(_, legs)| !legs.is_empty())
            .map(|(reg, _)| reg.as_str())
    }

    /// First leg on the tail overlapping `leg` in time, if any.
    pub fn find_overlap(&self, registration: &str, leg: &FlightLeg) -> Option<&'a FlightLeg> {
        self.legs(registration)
            .iter()
            .find(|existing| existing.overlaps(leg))
            .copied()
    }

    /// The tail's most recent leg ending at or before `leg` departs.
    pub fn previous_leg(&self, registration: &str, leg: &FlightLeg) -> Option<&'a FlightLeg> {
        self.legs(registration)
            .iter()
            .filter(|existing| existing.arrival_instant() <= leg.departure_instant())
            .max_by_key(|existing| existing.arrival_instant())
            .copied()
    }

    /// The tail's earliest leg departing at or after `leg` arrives.
    pub fn next_leg(&self, registration: &str, leg: &FlightLeg) -> Option<&'a FlightLeg> {
        self.legs(registration)
            .iter()
            .filter(|existing| existing.departure_instant() >= leg.arrival_instant())
            .min_by_key(|existing| existing.departure_instant())
            .copied()
    }

    /// Number of legs a tail flies on a date.
    pub fn legs_on_date(&self, registration: &str, date: NaiveDate) -> usize {
        self.legs(registration)
            .iter()
            .filter(|leg| leg.date == date)
            .count()
    }

    /// Total assigned block minutes on a tail across the horizon.
    pub fn block_minutes(&self, registration: &str) -> i64 {
        self.legs(registration)
            .iter()
            .map(|leg| leg.block_minutes())
            .sum()
    }
}
