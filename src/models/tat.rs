//! Directional turnaround-time (TAT) table.
//!
//! Minimum ground time between an arrival and the next departure on the
//! same tail depends on the aircraft type and on the domestic/international
//! combination of the two legs. Each type carries four scheduled minimums
//! and four absolute minimums plus a single fallback default; a per-type
//! override record may replace any subset of the scheduled cases.
//!
//! Resolution follows a fixed four-level fallback:
//! override → type-specific case value → type default → 0 (unconstrained).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four domestic/international transition cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TatCase {
    /// Domestic arrival → domestic departure.
    DomDom,
    /// Domestic arrival → international departure.
    DomInt,
    /// International arrival → domestic departure.
    IntDom,
    /// International arrival → international departure.
    IntInt,
}

impl TatCase {
    /// Selects the case from the arriving and departing legs' classification.
    pub fn from_legs(arriving_domestic: bool, departing_domestic: bool) -> Self {
        match (arriving_domestic, departing_domestic) {
            (true, true) => TatCase::DomDom,
            (true, false) => TatCase::DomInt,
            (false, true) => TatCase::IntDom,
            (false, false) => TatCase::IntInt,
        }
    }
}

/// Four per-case minute values, any of which may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalMinutes {
    pub dom_dom: Option<i64>,
    pub dom_int: Option<i64>,
    pub int_dom: Option<i64>,
    pub int_int: Option<i64>,
}

impl DirectionalMinutes {
    /// All four cases set to the same value.
    pub fn uniform(minutes: i64) -> Self {
        Self {
            dom_dom: Some(minutes),
            dom_int: Some(minutes),
            int_dom: Some(minutes),
            int_int: Some(minutes),
        }
    }

    /// The value for one case, if set.
    pub fn get(&self, case: TatCase) -> Option<i64> {
        match case {
            TatCase::DomDom => self.dom_dom,
            TatCase::DomInt => self.dom_int,
            TatCase::IntDom => self.int_dom,
            TatCase::IntInt => self.int_int,
        }
    }

    /// Sets the value for one case.
    pub fn set(&mut self, case: TatCase, minutes: i64) {
        match case {
            TatCase::DomDom => self.dom_dom = Some(minutes),
            TatCase::DomInt => self.dom_int = Some(minutes),
            TatCase::IntDom => self.int_dom = Some(minutes),
            TatCase::IntInt => self.int_int = Some(minutes),
        }
    }
}

/// Per-type scheduled and absolute turnaround minimums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftTypeTat {
    /// Aircraft type code.
    pub aircraft_type: String,
    /// Scheduled (planning) minimums per case.
    pub scheduled: DirectionalMinutes,
    /// Absolute (physical) minimums per case.
    pub absolute: DirectionalMinutes,
    /// Fallback when a case has no value. 0 = unconstrained.
    pub default_minutes: i64,
}

impl AircraftTypeTat {
    /// Creates a TAT entry with only a fallback default.
    pub fn new(aircraft_type: impl Into<String>, default_minutes: i64) -> Self {
        Self {
            aircraft_type: aircraft_type.into(),
            scheduled: DirectionalMinutes::default(),
            absolute: DirectionalMinutes::default(),
            default_minutes,
        }
    }

    /// Sets the scheduled minimum for one case.
    pub fn with_scheduled(mut self, case: TatCase, minutes: i64) -> Self {
        self.scheduled.set(case, minutes);
        self
    }

    /// Sets the absolute minimum for one case.
    pub fn with_absolute(mut self, case: TatCase, minutes: i64) -> Self {
        self.absolute.set(case, minutes);
        self
    }
}

/// Manual replacement values for a subset of a type's scheduled cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TatOverride {
    /// Aircraft type this override applies to.
    pub aircraft_type: String,
    /// Replacement values; unset cases fall back to the type's own value.
    pub scheduled: DirectionalMinutes,
}

impl TatOverride {
    /// Creates an empty override for a type.
    pub fn new(aircraft_type: impl Into<String>) -> Self {
        Self {
            aircraft_type: aircraft_type.into(),
            scheduled: DirectionalMinutes::default(),
        }
    }

    /// Sets the replacement value for one case.
    pub fn with_case(mut self, case: TatCase, minutes: i64) -> Self {
        self.scheduled.set(case, minutes);
        self
    }
}

/// The full TAT table: per-type entries plus per-type overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TatTable {
    types: HashMap<String, AircraftTypeTat>,
    overrides: HashMap<String, TatOverride>,
}

impl TatTable {
    /// Creates an empty table. Unknown types resolve to 0 (unconstrained).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a type entry.
    pub fn with_type(mut self, entry: AircraftTypeTat) -> Self {
        self.types.insert(entry.aircraft_type.clone(), entry);
        self
    }

    /// Builder: adds an override record.
    pub fn with_override(mut self, record: TatOverride) -> Self {
        self.overrides.insert(record.aircraft_type.clone(), record);
        self
    }

    /// Whether the table has an entry for a type.
    pub fn has_type(&self, aircraft_type: &str) -> bool {
        self.types.contains_key(aircraft_type)
    }

    /// Resolves the scheduled minimum ground time in minutes.
    ///
    /// Pure function of its inputs: override value for the case →
    /// the type's own case value → the type's default → 0.
    pub fn resolve(
        &self,
        aircraft_type: &str,
        arriving_domestic: bool,
        departing_domestic: bool,
    ) -> i64 {
        let case = TatCase::from_legs(arriving_domestic, departing_domestic);

        if let Some(record) = self.overrides.get(aircraft_type) {
            if let Some(minutes) = record.scheduled.get(case) {
                return minutes;
            }
        }
        match self.types.get(aircraft_type) {
            Some(entry) => entry.scheduled.get(case).unwrap_or(entry.default_minutes),
            None => 0,
        }
    }

    /// Resolves the absolute minimum ground time in minutes.
    ///
    /// Overrides do not apply to absolute minimums; fallback is the type's
    /// default, then 0.
    pub fn resolve_absolute(
        &self,
        aircraft_type: &str,
        arriving_domestic: bool,
        departing_domestic: bool,
    ) -> i64 {
        let case = TatCase::from_legs(arriving_domestic, departing_domestic);
        match self.types.get(aircraft_type) {
            Some(entry) => entry.absolute.get(case).unwrap_or(entry.default_minutes),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TatTable {
        TatTable::new().with_type(
            AircraftTypeTat::new("DH8D", 25)
                .with_scheduled(TatCase::DomDom, 30)
                .with_scheduled(TatCase::DomInt, 45)
                .with_scheduled(TatCase::IntDom, 40)
                .with_absolute(TatCase::DomDom, 20),
        )
    }

    #[test]
    fn test_case_selection() {
        assert_eq!(TatCase::from_legs(true, true), TatCase::DomDom);
        assert_eq!(TatCase::from_legs(true, false), TatCase::DomInt);
        assert_eq!(TatCase::from_legs(false, true), TatCase::IntDom);
        assert_eq!(TatCase::from_legs(false, false), TatCase::IntInt);
    }

    #[test]
    fn test_resolve_type_values() {
        let t = table();
        assert_eq!(t.resolve("DH8D", true, true), 30);
        assert_eq!(t.resolve("DH8D", true, false), 45);
        assert_eq!(t.resolve("DH8D", false, true), 40);
    }

    #[test]
    fn test_resolve_falls_back_to_type_default() {
        let t = table();
        // int_int is unset on the type → default 25
        assert_eq!(t.resolve("DH8D", false, false), 25);
    }

    #[test]
    fn test_resolve_unknown_type_unconstrained() {
        let t = table();
        assert_eq!(t.resolve("B748", true, true), 0);
        assert_eq!(t.resolve_absolute("B748", true, true), 0);
    }

    #[test]
    fn test_override_takes_precedence() {
        let t = table().with_override(TatOverride::new("DH8D").with_case(TatCase::DomDom, 35));

        assert_eq!(t.resolve("DH8D", true, true), 35);
        // Cases the override leaves unset fall back to the type's value.
        assert_eq!(t.resolve("DH8D", true, false), 45);
        // And through to the type default where the type is also unset.
        assert_eq!(t.resolve("DH8D", false, false), 25);
    }

    #[test]
    fn test_resolve_is_pure() {
        let t = table().with_override(TatOverride::new("DH8D").with_case(TatCase::IntDom, 55));
        let first = t.resolve("DH8D", false, true);
        for _ in 0..10 {
            assert_eq!(t.resolve("DH8D", false, true), first);
        }
        assert_eq!(first, 55);
    }

    #[test]
    fn test_absolute_ignores_override() {
        let t = table().with_override(TatOverride::new("DH8D").with_case(TatCase::DomDom, 60));
        assert_eq!(t.resolve_absolute("DH8D", true, true), 20);
        // Absolute unset cases fall back to the default.
        assert_eq!(t.resolve_absolute("DH8D", false, false), 25);
    }

    #[test]
    fn test_uniform_minutes() {
        let u = DirectionalMinutes::uniform(35);
        assert_eq!(u.get(TatCase::DomDom), Some(35));
        assert_eq!(u.get(TatCase::IntInt), Some(35));
    }
}
