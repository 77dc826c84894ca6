//! Flight leg model.
//!
//! A flight leg is one scheduled departure on one calendar date. Legs are
//! produced by the schedule publishing pipeline for a committed date range
//! and are read-only input to every engine in this crate: overrides are
//! recorded in the manual override layer, never on the leg itself.
//!
//! # Time Representation
//! Departure and arrival times are minutes from midnight of the leg's
//! calendar date. An arrival past midnight is expressed as a value above
//! 1440 rather than by rolling the date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// Identity of one flight instance: a stable flight identifier plus the
/// calendar date it operates.
///
/// Serializes as `"<flight_id>@<date>"` so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightKey {
    /// Stable flight identifier.
    pub flight_id: String,
    /// Calendar date of this instance.
    pub date: NaiveDate,
}

impl FlightKey {
    /// Creates a key for a flight instance.
    pub fn new(flight_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            flight_id: flight_id.into(),
            date,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.flight_id, self.date)
    }
}

impl FromStr for FlightKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (flight_id, date) = s
            .rsplit_once('@')
            .ok_or_else(|| format!("flight key '{s}' missing '@' separator"))?;
        let date = NaiveDate::from_str(date)
            .map_err(|e| format!("flight key '{s}' has invalid date: {e}"))?;
        Ok(Self::new(flight_id, date))
    }
}

impl Serialize for FlightKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlightKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One scheduled departure on one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightLeg {
    /// Stable flight identifier.
    pub id: String,
    /// Commercial flight number (e.g. "WX612").
    pub number: String,
    /// Departure station code.
    pub departure_station: String,
    /// Arrival station code.
    pub arrival_station: String,
    /// Scheduled departure, minutes from midnight of `date`.
    pub departure_minutes: i64,
    /// Scheduled arrival, minutes from midnight of `date`. May exceed 1440.
    pub arrival_minutes: i64,
    /// Scheduled aircraft type.
    pub aircraft_type: String,
    /// Calendar date this instance operates.
    pub date: NaiveDate,
    /// Manual override: when present this leg is immutable input to the
    /// engines and its tail is fixed.
    pub pinned_registration: Option<String>,
    /// Groups legs into multi-sector rotations; consecutive same-route legs
    /// are a deliberate circuit and skip the station/TAT chain check.
    pub route_id: Option<String>,
    /// Whether this leg is an international sector.
    pub international: bool,
    /// Domain-specific key-value metadata.
    pub attributes: HashMap<String, String>,
}

impl FlightLeg {
    /// Creates a leg with the given identity, stations, and times.
    pub fn new(
        id: impl Into<String>,
        departure_station: impl Into<String>,
        arrival_station: impl Into<String>,
        departure_minutes: i64,
        arrival_minutes: i64,
        date: NaiveDate,
    ) -> Self {
        let id = id.into();
        Self {
            number: id.clone(),
            id,
            departure_station: departure_station.into(),
            arrival_station: arrival_station.into(),
            departure_minutes,
            arrival_minutes,
            aircraft_type: String::new(),
            date,
            pinned_registration: None,
            route_id: None,
            international: false,
            attributes: HashMap::new(),
        }
    }

    /// Sets the commercial flight number.
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    /// Sets the scheduled aircraft type.
    pub fn with_aircraft_type(mut self, aircraft_type: impl Into<String>) -> Self {
        self.aircraft_type = aircraft_type.into();
        self
    }

    /// Pins this leg to a registration (manual override).
    pub fn with_pinned_registration(mut self, registration: impl Into<String>) -> Self {
        self.pinned_registration = Some(registration.into());
        self
    }

    /// Sets the rotation route identifier.
    pub fn with_route(mut self, route_id: impl Into<String>) -> Self {
        self.route_id = Some(route_id.into());
        self
    }

    /// Marks this leg as an international sector.
    pub fn international(mut self) -> Self {
        self.international = true;
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The flight-instance key for this leg.
    pub fn key(&self) -> FlightKey {
        FlightKey::new(self.id.clone(), self.date)
    }

    /// Whether this leg is a domestic sector.
    #[inline]
    pub fn is_domestic(&self) -> bool {
        !self.international
    }

    /// Block duration in minutes.
    #[inline]
    pub fn block_minutes(&self) -> i64 {
        self.arrival_minutes - self.departure_minutes
    }

    /// Departure expressed as absolute minutes on a continuous timeline.
    #[inline]
    pub fn departure_instant(&self) -> i64 {
        self.date.num_days_from_ce() as i64 * MINUTES_PER_DAY + self.departure_minutes
    }

    /// Arrival expressed as absolute minutes on a continuous timeline.
    #[inline]
    pub fn arrival_instant(&self) -> i64 {
        self.date.num_days_from_ce() as i64 * MINUTES_PER_DAY + self.arrival_minutes
    }

    /// Whether two legs occupy overlapping time on a shared tail.
    pub fn overlaps(&self, other: &FlightLeg) -> bool {
        self.departure_instant() < other.arrival_instant()
            && other.departure_instant() < self.arrival_instant()
    }

    /// Whether `self` and `other` belong to the same multi-sector route.
    pub fn same_route(&self, other: &FlightLeg) -> bool {
        match (&self.route_id, &other.route_id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    #[test]
    fn test_leg_builder() {
        let leg = FlightLeg::new("F1", "OSL", "TRD", 480, 535, date())
            .with_number("WX612")
            .with_aircraft_type("DH8D")
            .with_route("R7")
            .with_attribute("service", "scheduled");

        assert_eq!(leg.id, "F1");
        assert_eq!(leg.number, "WX612");
        assert_eq!(leg.aircraft_type, "DH8D");
        assert_eq!(leg.route_id.as_deref(), Some("R7"));
        assert!(leg.is_domestic());
        assert_eq!(leg.block_minutes(), 55);
        assert_eq!(leg.attributes.get("service"), Some(&"scheduled".to_string()));
    }

    #[test]
    fn test_overnight_arrival_instant() {
        // Departs 23:30, arrives 00:50 next day (1490 minutes).
        let leg = FlightLeg::new("F1", "OSL", "LHR", 1410, 1490, date());
        assert_eq!(leg.block_minutes(), 80);
        assert_eq!(leg.arrival_instant() - leg.departure_instant(), 80);
    }

    #[test]
    fn test_overlap_detection() {
        let a = FlightLeg::new("A", "OSL", "TRD", 480, 540, date());
        let b = FlightLeg::new("B", "TRD", "BOO", 530, 590, date());
        let c = FlightLeg::new("C", "TRD", "BOO", 540, 600, date());

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // touching end-to-start is not an overlap

        // Different dates never overlap for same-day times
        let next_day = FlightLeg::new("D", "OSL", "TRD", 480, 540, date().succ_opt().unwrap());
        assert!(!a.overlaps(&next_day));
    }

    #[test]
    fn test_same_route() {
        let a = FlightLeg::new("A", "OSL", "TRD", 480, 540, date()).with_route("R1");
        let b = FlightLeg::new("B", "TRD", "OSL", 560, 620, date()).with_route("R1");
        let c = FlightLeg::new("C", "TRD", "OSL", 560, 620, date()).with_route("R2");
        let d = FlightLeg::new("D", "TRD", "OSL", 560, 620, date());

        assert!(a.same_route(&b));
        assert!(!a.same_route(&c));
        assert!(!a.same_route(&d)); // unset route is never "same"
    }

    #[test]
    fn test_flight_key_display_and_parse() {
        let key = FlightKey::new("F1", date());
        assert_eq!(key.to_string(), "F1@2024-03-11");

        let parsed: FlightKey = "F1@2024-03-11".parse().unwrap();
        assert_eq!(parsed, key);

        assert!("no-separator".parse::<FlightKey>().is_err());
        assert!("F1@not-a-date".parse::<FlightKey>().is_err());
    }

    #[test]
    fn test_flight_key_serde_as_map_key() {
        let mut map = HashMap::new();
        map.insert(FlightKey::new("F1", date()), "LN-WDA".to_string());

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("F1@2024-03-11"));

        let back: HashMap<FlightKey, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[&FlightKey::new("F1", date())], "LN-WDA");
    }
}
