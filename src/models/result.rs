//! Assignment result model.
//!
//! `TailAssignmentResult` is the single shape every engine produces —
//! greedy construction, annealing refinement, or the remote MIP solver —
//! so the rendering and reporting layers never distinguish the source.
//!
//! Invariant: every flight instance appears in exactly one of the
//! assignment map and the overflow list, never both.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::FlightKey;

/// Which engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMethod {
    /// Greedy/balanced single-sweep constructor.
    Heuristic,
    /// Simulated-annealing refinement of a constructor result.
    Annealed,
    /// Remote MIP solver.
    Remote,
}

/// A candidate aircraft rejected for a flight during construction, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRejection {
    /// The rejected candidate's registration.
    pub registration: String,
    /// Why the candidate was infeasible.
    pub reason: RejectionReason,
}

/// Why a candidate aircraft was rejected for a flight during construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    /// A hard rule eliminated the candidate.
    HardRule { rule: String, message: String },
    /// The flight would overlap a leg already on the candidate tail.
    Overlap { with_flight: FlightKey },
    /// Chaining after the tail's most recent leg is impossible.
    ChainConflict {
        after_flight: FlightKey,
        detail: ChainConflictDetail,
    },
}

/// What made a chain infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainConflictDetail {
    /// Previous arrival station differs from this departure station.
    StationBreak {
        arrival_station: String,
        departure_station: String,
    },
    /// Ground time below the scheduled minimum.
    Turnaround { gap_minutes: i64, min_tat: i64 },
}

/// A soft-rule violation recorded against a flight's final assignment,
/// or a surfaced pinned-assignment conflict (penalty 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    /// Name of the triggering rule.
    pub rule: String,
    /// Human-readable description.
    pub message: String,
    /// Penalty cost contributed to the result total.
    pub penalty: i64,
}

/// Two chronologically adjacent same-tail legs whose stations don't match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainBreak {
    pub registration: String,
    pub from_flight: FlightKey,
    pub to_flight: FlightKey,
    pub arrival_station: String,
    pub departure_station: String,
}

/// A flight no feasible aircraft could take, keyed by its scheduled type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowFlight {
    pub flight: FlightKey,
    /// The flight's scheduled aircraft type, even when family substitution
    /// was attempted and failed.
    pub aircraft_type: String,
}

/// A cross-type assignment within a shared family.
///
/// Flagged individually because it changes cabin configuration and
/// block-time assumptions; never folded into ordinary violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySubstitution {
    pub flight: FlightKey,
    pub scheduled_type: String,
    pub assigned_type: String,
}

/// Aggregate counts for one result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub total_flights: usize,
    pub assigned: usize,
    pub overflowed: usize,
    /// Hard-rule rejections recorded during construction.
    pub hard_rules_enforced: usize,
    /// Soft-rule violations standing against final assignments.
    pub soft_rules_bent: usize,
    /// Sum of soft-violation penalty costs.
    pub total_penalty: i64,
}

/// A complete assignment with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailAssignmentResult {
    /// Which engine produced this result.
    pub method: AssignmentMethod,
    /// Flight instance → assigned registration.
    pub assignments: HashMap<FlightKey, String>,
    /// Flights no feasible aircraft could take.
    pub overflow: Vec<OverflowFlight>,
    /// Station-continuity breaks in the final rotations.
    pub chain_breaks: Vec<ChainBreak>,
    /// Violations standing against each flight's final assignment.
    pub violations: HashMap<FlightKey, Vec<RuleViolation>>,
    /// Candidates rejected per flight during construction, and why.
    pub rejections: HashMap<FlightKey, Vec<CandidateRejection>>,
    /// Cross-type assignments within a family.
    pub substitutions: HashMap<FlightKey, FamilySubstitution>,
    /// Aggregate counts.
    pub summary: AssignmentSummary,
}

impl TailAssignmentResult {
    /// Creates an empty result for an engine.
    pub fn new(method: AssignmentMethod) -> Self {
        Self {
            method,
            assignments: HashMap::new(),
            overflow: Vec::new(),
            chain_breaks: Vec::new(),
            violations: HashMap::new(),
            rejections: HashMap::new(),
            substitutions: HashMap::new(),
            summary: AssignmentSummary::default(),
        }
    }

    /// The registration assigned to a flight instance, if any.
    pub fn registration_for(&self, key: &FlightKey) -> Option<&str> {
        self.assignments.get(key).map(String::as_str)
    }

    /// Whether a flight landed in the overflow pool.
    pub fn is_overflowed(&self, key: &FlightKey) -> bool {
        self.overflow.iter().any(|o| &o.flight == key)
    }

    /// Flight keys assigned to a registration, in no particular order.
    pub fn flights_for_registration(&self, registration: &str) -> Vec<&FlightKey> {
        self.assignments
            .iter()
            .filter(|(_, reg)| reg.as_str() == registration)
            .map(|(key, _)| key)
            .collect()
    }

    /// Violations recorded against a flight's final assignment.
    pub fn violations_for(&self, key: &FlightKey) -> &[RuleViolation] {
        self.violations.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rejection diagnostics recorded for a flight during construction.
    pub fn rejections_for(&self, key: &FlightKey) -> &[CandidateRejection] {
        self.rejections.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Recomputes the summary counts from the result body.
    ///
    /// `hard_rules_enforced` counts hard-rule rejections, which live in the
    /// rejection map rather than the violation map.
    pub fn recompute_summary(&mut self) {
        let soft: Vec<&RuleViolation> = self
            .violations
            .values()
            .flatten()
            .filter(|v| v.penalty > 0)
            .collect();
        self.summary = AssignmentSummary {
            total_flights: self.assignments.len() + self.overflow.len(),
            assigned: self.assignments.len(),
            overflowed: self.overflow.len(),
            hard_rules_enforced: self
                .rejections
                .values()
                .flatten()
                .filter(|r| matches!(r.reason, RejectionReason::HardRule { .. }))
                .count(),
            soft_rules_bent: soft.len(),
            total_penalty: soft.iter().map(|v| v.penalty).sum(),
        };
    }
}
