//! Swap feasibility validation.
//!
//! Given two groups of flights currently on two different tails, decides
//! whether exchanging them is feasible: the move may introduce no new
//! time overlap and no new station-chain break. Turnaround shortfalls are
//! surfaced as warnings rather than blockers, because swaps are often
//! made precisely to resolve a different, worse conflict.
//!
//! A swap is all-or-nothing: either both groups fully relocate or
//! nothing moves.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::conflict::evaluate_gap;
use crate::constructor::{annotate, AssignmentInput};
use crate::models::{FlightKey, FlightLeg, TailAssignmentResult};
use crate::rules::RuleSet;
use crate::timeline::Timelines;

/// Outcome of validating one swap request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapEvaluation {
    /// Whether the exchange may be applied.
    pub feasible: bool,
    /// One finding per moved leg, against its target tail.
    pub details: Vec<SwapLegDetail>,
}

/// Finding for one moved leg on its target tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLegDetail {
    /// The moved flight.
    pub flight: FlightKey,
    /// The tail the leg would move to.
    pub registration: String,
    /// What the validator found.
    pub finding: SwapFinding,
}

/// Per-leg validation finding, worst first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapFinding {
    /// The flight is not currently assigned to the stated tail; the
    /// request is stale.
    NotAssigned,
    /// Would overlap a leg staying on the target tail.
    Overlap { with_flight: FlightKey },
    /// Would break station continuity with a neighbor.
    StationBreak {
        arrival_station: String,
        departure_station: String,
    },
    /// Ground time below the scheduled minimum. Warning only.
    TatShortfall { gap_minutes: i64, min_tat: i64 },
    /// No problem found.
    Clear,
}

impl SwapFinding {
    /// Whether this finding blocks the swap.
    pub fn blocks(&self) -> bool {
        matches!(
            self,
            SwapFinding::NotAssigned | SwapFinding::Overlap { .. } | SwapFinding::StationBreak { .. }
        )
    }

    fn rank(&self) -> u8 {
        match self {
            SwapFinding::NotAssigned => 0,
            SwapFinding::Overlap { .. } => 1,
            SwapFinding::StationBreak { .. } => 2,
            SwapFinding::TatShortfall { .. } => 3,
            SwapFinding::Clear => 4,
        }
    }
}

/// Validates exchanging `group_a` (on `registration_a`) with `group_b`
/// (on `registration_b`) against the current assignment.
pub fn validate_swap(
    input: &AssignmentInput,
    current: &TailAssignmentResult,
    group_a: &[FlightKey],
    registration_a: &str,
    group_b: &[FlightKey],
    registration_b: &str,
) -> SwapEvaluation {
    let legs_by_key: HashMap<FlightKey, &FlightLeg> = input
        .flights
        .iter()
        .map(|leg| (leg.key(), leg))
        .collect();

    let mut timelines = Timelines::from_assignments(&input.flights, &current.assignments);
    let mut details: Vec<SwapLegDetail> = Vec::new();
    let mut moved: HashSet<FlightKey> = HashSet::new();

    // Lift both groups off their current tails first, verifying the
    // request against the assignment it claims to describe.
    for (group, registration) in [(group_a, registration_a), (group_b, registration_b)] {
        for key in group {
            if current.registration_for(key) == Some(registration) {
                timelines.remove(registration, key);
                moved.insert(key.clone());
            } else {
                details.push(SwapLegDetail {
                    flight: key.clone(),
                    registration: registration.to_string(),
                    finding: SwapFinding::NotAssigned,
                });
            }
        }
    }

    let type_of = |registration: &str| {
        input
            .fleet
            .iter()
            .find(|tail| tail.registration == registration)
            .map(|tail| tail.aircraft_type.clone())
            .unwrap_or_default()
    };

    // Place each group on the other tail and evaluate every moved leg
    // against its new neighbors.
    for (group, target) in [(group_a, registration_b), (group_b, registration_a)] {
        let target_type = type_of(target);
        let mut placed: Vec<&FlightLeg> = Vec::new();
        for key in group {
            if !moved.contains(key) {
                continue;
            }
            let Some(&leg) = legs_by_key.get(key) else {
                continue;
            };
            // Inserted even when conflicting so intra-group neighbors
            // evaluate against the full relocated block.
            timelines.insert(target, leg);
            placed.push(leg);
        }

        for leg in &placed {
            let mut findings: Vec<SwapFinding> = Vec::new();
            for other in timelines.legs(target) {
                if other.key() != leg.key() && other.overlaps(leg) {
                    findings.push(SwapFinding::Overlap {
                        with_flight: other.key(),
                    });
                    break;
                }
            }

            if let Some(prev) = timelines.previous_leg(target, leg) {
                findings.extend(pair_finding(prev, leg, &target_type, input));
            }
            if let Some(next) = timelines.next_leg(target, leg) {
                // The pair is covered from the other side when `next` was
                // itself moved in this request.
                if !moved.contains(&next.key()) {
                    findings.extend(pair_finding(leg, next, &target_type, input));
                }
            }

            findings.sort_by_key(SwapFinding::rank);
            details.push(SwapLegDetail {
                flight: leg.key(),
                registration: target.to_string(),
                finding: findings.into_iter().next().unwrap_or(SwapFinding::Clear),
            });
        }
    }

    SwapEvaluation {
        feasible: !details.is_empty() && details.iter().all(|d| !d.finding.blocks()),
        details,
    }
}

/// Evaluates one adjacent pair on the target tail.
fn pair_finding(
    prev: &FlightLeg,
    next: &FlightLeg,
    aircraft_type: &str,
    input: &AssignmentInput,
) -> Option<SwapFinding> {
    if prev.same_route(next) {
        return None;
    }
    if prev.arrival_station != next.departure_station {
        return Some(SwapFinding::StationBreak {
            arrival_station: prev.arrival_station.clone(),
            departure_station: next.departure_station.clone(),
        });
    }
    match evaluate_gap(prev, next, aircraft_type, &input.tat) {
        Some(eval) if !eval.ok => Some(SwapFinding::TatShortfall {
            gap_minutes: eval.gap_minutes,
            min_tat: eval.min_tat,
        }),
        _ => None,
    }
}

/// Applies a validated swap, or returns `None` when validation fails —
/// partial application is never produced.
pub fn apply_swap(
    input: &AssignmentInput,
    current: &TailAssignmentResult,
    rules: &RuleSet,
    group_a: &[FlightKey],
    registration_a: &str,
    group_b: &[FlightKey],
    registration_b: &str,
) -> Option<TailAssignmentResult> {
    let evaluation = validate_swap(
        input,
        current,
        group_a,
        registration_a,
        group_b,
        registration_b,
    );
    if !evaluation.feasible {
        return None;
    }

    let mut assignments = current.assignments.clone();
    for key in group_a {
        assignments.insert(key.clone(), registration_b.to_string());
    }
    for key in group_b {
        assignments.insert(key.clone(), registration_a.to_string());
    }
    Some(annotate(
        input,
        rules,
        current.method,
        assignments,
        current.overflow.clone(),
        current.rejections.clone(),
    ))
}
