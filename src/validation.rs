//! Input validation for assignment problems.
//!
//! Checks structural integrity of flights, fleet, and overrides before
//! an engine run. Detects:
//! - Duplicate flight instances and registrations
//! - Pins referencing unknown or non-operational tails
//! - Overlapping pins on the same tail (malformed overrides)
//! - Flight types missing from the TAT table
//!
//! Pinned data reflects real operational intent, so malformed pins are
//! reported for a human to reconcile rather than silently dropped; the
//! engines still honor them.

use std::collections::{HashMap, HashSet};

use crate::models::{AssignableAircraft, FlightKey, FlightLeg, TatTable};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same identity.
    DuplicateId,
    /// A pin references a registration outside the fleet.
    UnknownPinnedRegistration,
    /// A pin references a tail that is not operational.
    InactivePinnedRegistration,
    /// Two pins on the same tail overlap in time.
    PinnedOverlap,
    /// A leg's aircraft type has no TAT entry.
    MissingTatEntry,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for an assignment run.
///
/// Checks:
/// 1. No duplicate flight instances (flight id + date)
/// 2. No duplicate registrations
/// 3. Every pin references a known, operational tail
/// 4. No two pins on the same tail overlap in time
/// 5. Every flight's aircraft type has a TAT entry
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    flights: &[FlightLeg],
    fleet: &[AssignableAircraft],
    tat: &TatTable,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut registrations = HashSet::new();
    for tail in fleet {
        if !registrations.insert(tail.registration.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate registration: {}", tail.registration),
            ));
        }
    }
    let fleet_by_registration: HashMap<&str, &AssignableAircraft> = fleet
        .iter()
        .map(|tail| (tail.registration.as_str(), tail))
        .collect();

    let mut keys: HashSet<FlightKey> = HashSet::new();
    for leg in flights {
        if !keys.insert(leg.key()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate flight instance: {}", leg.key()),
            ));
        }

        if !leg.aircraft_type.is_empty() && !tat.has_type(&leg.aircraft_type) {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingTatEntry,
                format!(
                    "Flight {} uses type {} with no TAT entry",
                    leg.key(),
                    leg.aircraft_type
                ),
            ));
        }

        if let Some(registration) = &leg.pinned_registration {
            match fleet_by_registration.get(registration.as_str()) {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownPinnedRegistration,
                    format!(
                        "Flight {} is pinned to unknown registration {}",
                        leg.key(),
                        registration
                    ),
                )),
                Some(tail) if !tail.is_assignable() => errors.push(ValidationError::new(
                    ValidationErrorKind::InactivePinnedRegistration,
                    format!(
                        "Flight {} is pinned to non-operational tail {}",
                        leg.key(),
                        registration
                    ),
                )),
                Some(_) => {}
            }
        }
    }

    errors.extend(detect_pinned_overlaps(flights));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Finds pairs of pinned legs that overlap on the same tail.
fn detect_pinned_overlaps(flights: &[FlightLeg]) -> Vec<ValidationError> {
    let mut pinned_by_registration: HashMap<&str, Vec<&FlightLeg>> = HashMap::new();
    for leg in flights {
        if let Some(registration) = &leg.pinned_registration {
            pinned_by_registration
                .entry(registration.as_str())
                .or_default()
                .push(leg);
        }
    }

    let mut errors = Vec::new();
    let mut registrations: Vec<&&str> = pinned_by_registration.keys().collect();
    registrations.sort_unstable();
    for registration in registrations {
        let legs = &pinned_by_registration[*registration];
        for (i, a) in legs.iter().enumerate() {
            for b in &legs[i + 1..] {
                if a.overlaps(b) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::PinnedOverlap,
                        format!(
                            "Pinned flights {} and {} overlap on {}",
                            a.key(),
                            b.key(),
                            registration
                        ),
                    ));
                }
            }
        }
    }
    errors
}
