//! Assignable aircraft model.
//!
//! A tail is a physical aircraft identified by registration. Only
//! operational tails participate in assignment; the fleet list is
//! immutable for the duration of one engine run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tail eligible for assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignableAircraft {
    /// Registration (e.g. "LN-WDA").
    pub registration: String,
    /// Aircraft type code (e.g. "DH8D").
    pub aircraft_type: String,
    /// Station where the tail is normally based overnight.
    pub home_base: Option<String>,
    /// Operational status; only `Operational` tails are candidates.
    pub status: AircraftStatus,
    /// Whether the tail is equipped for international sectors.
    pub international_capable: bool,
    /// Domain-specific metadata.
    pub attributes: HashMap<String, String>,
}

/// Operational status of a tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftStatus {
    /// In service and assignable.
    Operational,
    /// In scheduled or unscheduled maintenance.
    Maintenance,
    /// Parked / long-term storage.
    Stored,
}

impl AssignableAircraft {
    /// Creates an operational tail.
    pub fn new(registration: impl Into<String>, aircraft_type: impl Into<String>) -> Self {
        Self {
            registration: registration.into(),
            aircraft_type: aircraft_type.into(),
            home_base: None,
            status: AircraftStatus::Operational,
            international_capable: true,
            attributes: HashMap::new(),
        }
    }

    /// Sets the home base station.
    pub fn with_home_base(mut self, station: impl Into<String>) -> Self {
        self.home_base = Some(station.into());
        self
    }

    /// Sets the operational status.
    pub fn with_status(mut self, status: AircraftStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the tail as domestic-only.
    pub fn domestic_only(mut self) -> Self {
        self.international_capable = false;
        self
    }

    /// Adds a domain-specific attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether this tail participates in assignment.
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.status == AircraftStatus::Operational
    }
}

/// Aircraft type → family label map.
///
/// Two types sharing a family label are mutual substitution candidates
/// when family substitution is enabled. A type absent from the map has no
/// family and can never be substituted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyMap {
    families: HashMap<String, String>,
}

impl FamilyMap {
    /// Creates an empty family map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: assigns a type to a family.
    pub fn with_member(mut self, aircraft_type: impl Into<String>, family: impl Into<String>) -> Self {
        self.families.insert(aircraft_type.into(), family.into());
        self
    }

    /// Assigns a type to a family.
    pub fn add_member(&mut self, aircraft_type: impl Into<String>, family: impl Into<String>) {
        self.families.insert(aircraft_type.into(), family.into());
    }

    /// Family label for a type, if configured.
    pub fn family_of(&self, aircraft_type: &str) -> Option<&str> {
        self.families.get(aircraft_type).map(String::as_str)
    }

    /// Whether two types belong to the same family.
    ///
    /// A type is always "same family" as itself, even when unmapped.
    pub fn same_family(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match (self.family_of(a), self.family_of(b)) {
            (Some(fa), Some(fb)) => fa == fb,
            _ => false,
        }
    }

    /// Whether any family assignments are configured.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
