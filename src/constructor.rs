//! Greedy/balanced assignment construction.
//!
//! # Algorithm
//!
//! 1. Reserve every pinned flight on its overridden tail.
//! 2. Process the remaining flights in ascending (date, departure) order.
//! 3. For each flight, check every candidate tail of the flight's type
//!    (plus family peers when substitution is enabled): time overlap,
//!    station/TAT chaining after the tail's most recent leg, hard rules.
//! 4. Rank feasible candidates by the configured objective and assign the
//!    best; flights with no feasible candidate go to the overflow pool.
//!
//! A single deterministic sweep with no backtracking — fast, not optimal.
//! Every infeasible candidate's rejection reason is recorded for
//! diagnostic display.
//!
//! # Reference
//! Grönkvist (2005), "The Tail Assignment Problem", Ch. 2 (sequential
//! construction heuristics)

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::conflict::evaluate_gap;
use crate::models::{
    AssignableAircraft, AssignmentMethod, CandidateRejection, ChainBreak, ChainConflictDetail,
    FamilyMap, FamilySubstitution, FlightKey, FlightLeg, OverflowFlight, RejectionReason,
    RuleViolation, TailAssignmentResult, TatTable,
};
use crate::rules::{Enforcement, RotationContext, RuleSet};
use crate::timeline::Timelines;

/// Candidate ranking objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    /// Pack usage onto as few tails as possible.
    #[default]
    MinimizeAircraft,
    /// Spread block time evenly across the fleet.
    BalanceUtilization,
}

/// Engine configuration, passed explicitly into each run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentConfig {
    /// How feasible candidates are ranked.
    pub objective: Objective,
    /// Whether flights may be placed on family-related types.
    pub family_substitution: bool,
}

/// Input container for one engine run. Immutable for its duration.
#[derive(Debug, Clone, Default)]
pub struct AssignmentInput {
    /// Flight legs for the committed date range, pins already resolved.
    pub flights: Vec<FlightLeg>,
    /// The assignable fleet.
    pub fleet: Vec<AssignableAircraft>,
    /// Directional turnaround minimums.
    pub tat: TatTable,
    /// Aircraft family labels for substitution.
    pub families: FamilyMap,
}

impl AssignmentInput {
    /// Creates an input from flights and fleet.
    pub fn new(flights: Vec<FlightLeg>, fleet: Vec<AssignableAircraft>) -> Self {
        Self {
            flights,
            fleet,
            tat: TatTable::new(),
            families: FamilyMap::new(),
        }
    }

    /// Sets the TAT table.
    pub fn with_tat(mut self, tat: TatTable) -> Self {
        self.tat = tat;
        self
    }

    /// Sets the family map.
    pub fn with_families(mut self, families: FamilyMap) -> Self {
        self.families = families;
        self
    }

    pub(crate) fn fleet_by_registration(&self) -> HashMap<&str, &AssignableAircraft> {
        self.fleet
            .iter()
            .map(|tail| (tail.registration.as_str(), tail))
            .collect()
    }
}

/// Feasibility details for a candidate that passed every check.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CandidateFit {
    /// Minutes between the tail's previous arrival and this departure;
    /// `i64::MAX` when the tail has no previous leg.
    pub gap_to_previous: i64,
}

/// Runs the per-candidate feasibility checks: overlap, chaining after the
/// tail's most recent leg (same-route circuits exempt), then hard rules.
pub(crate) fn check_candidate<'a>(
    leg: &FlightLeg,
    aircraft: &AssignableAircraft,
    timelines: &Timelines<'a>,
    tat: &TatTable,
    rules: &RuleSet,
) -> Result<CandidateFit, RejectionReason> {
    let registration = aircraft.registration.as_str();

    if let Some(blocking) = timelines.find_overlap(registration, leg) {
        return Err(RejectionReason::Overlap {
            with_flight: blocking.key(),
        });
    }

    let previous = timelines.previous_leg(registration, leg);
    let mut gap_to_previous = i64::MAX;
    if let Some(prev) = previous {
        gap_to_previous = leg.departure_instant() - prev.arrival_instant();
        if !prev.same_route(leg) {
            if prev.arrival_station != leg.departure_station {
                return Err(RejectionReason::ChainConflict {
                    after_flight: prev.key(),
                    detail: ChainConflictDetail::StationBreak {
                        arrival_station: prev.arrival_station.clone(),
                        departure_station: leg.departure_station.clone(),
                    },
                });
            }
            if let Some(eval) = evaluate_gap(prev, leg, &aircraft.aircraft_type, tat) {
                if !eval.ok {
                    return Err(RejectionReason::ChainConflict {
                        after_flight: prev.key(),
                        detail: ChainConflictDetail::Turnaround {
                            gap_minutes: eval.gap_minutes,
                            min_tat: eval.min_tat,
                        },
                    });
                }
            }
        }
    }

    let context = RotationContext {
        previous_leg: previous,
        next_leg: timelines.next_leg(registration, leg),
        legs_today: timelines.legs_on_date(registration, leg.date),
        block_minutes_today: timelines
            .legs(registration)
            .iter()
            .filter(|l| l.date == leg.date)
            .map(|l| l.block_minutes())
            .sum(),
    };
    if let Some(hard) = rules.first_hard(leg, aircraft, &context) {
        return Err(RejectionReason::HardRule {
            rule: hard.rule,
            message: hard.message,
        });
    }

    Ok(CandidateFit { gap_to_previous })
}

/// Greedy/balanced constructor.
#[derive(Debug, Clone, Default)]
pub struct Constructor {
    config: AssignmentConfig,
    rules: RuleSet,
}

impl Constructor {
    /// Creates a constructor with the given configuration.
    pub fn new(config: AssignmentConfig) -> Self {
        Self {
            config,
            rules: RuleSet::new(),
        }
    }

    /// Sets the operator rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Builds one complete assignment in a single sweep.
    pub fn construct(&self, input: &AssignmentInput) -> TailAssignmentResult {
        let fleet_by_registration = input.fleet_by_registration();
        let mut timelines = Timelines::new();
        let mut assignments: HashMap<FlightKey, String> = HashMap::new();
        let mut overflow: Vec<OverflowFlight> = Vec::new();
        let mut rejections: HashMap<FlightKey, Vec<CandidateRejection>> = HashMap::new();

        let mut order: Vec<&FlightLeg> = input.flights.iter().collect();
        order.sort_by(|a, b| {
            (a.date, a.departure_minutes, &a.id).cmp(&(b.date, b.departure_minutes, &b.id))
        });

        // Pinned flights reserve their tail before anything else is placed.
        for leg in order.iter().copied() {
            let Some(registration) = leg.pinned_registration.clone() else {
                continue;
            };
            match fleet_by_registration.get(registration.as_str()) {
                Some(tail) if tail.is_assignable() => {}
                Some(_) => warn!(
                    flight = %leg.key(),
                    %registration,
                    "pinned to a non-operational tail"
                ),
                None => warn!(
                    flight = %leg.key(),
                    %registration,
                    "pinned to a registration outside the fleet"
                ),
            }
            timelines.insert(&registration, leg);
            assignments.insert(leg.key(), registration);
        }

        for leg in order.iter().copied().filter(|l| l.pinned_registration.is_none()) {
            let mut candidates: Vec<&AssignableAircraft> = input
                .fleet
                .iter()
                .filter(|tail| tail.is_assignable())
                .filter(|tail| {
                    tail.aircraft_type == leg.aircraft_type
                        || (self.config.family_substitution
                            && input
                                .families
                                .same_family(&tail.aircraft_type, &leg.aircraft_type))
                })
                .collect();
            candidates.sort_by(|a, b| a.registration.cmp(&b.registration));

            let mut rejected: Vec<CandidateRejection> = Vec::new();
            let mut feasible: Vec<(&AssignableAircraft, CandidateFit)> = Vec::new();
            for tail in candidates {
                match check_candidate(leg, tail, &timelines, &input.tat, &self.rules) {
                    Ok(fit) => feasible.push((tail, fit)),
                    Err(reason) => rejected.push(CandidateRejection {
                        registration: tail.registration.clone(),
                        reason,
                    }),
                }
            }

            let best = self.rank(&timelines, leg, feasible);
            match best {
                Some(tail) => {
                    timelines.insert(&tail.registration, leg);
                    assignments.insert(leg.key(), tail.registration.clone());
                }
                None => {
                    debug!(flight = %leg.key(), aircraft_type = %leg.aircraft_type,
                           rejected = rejected.len(), "no feasible tail, overflowing");
                    overflow.push(OverflowFlight {
                        flight: leg.key(),
                        aircraft_type: leg.aircraft_type.clone(),
                    });
                }
            }
            if !rejected.is_empty() {
                rejections.insert(leg.key(), rejected);
            }
        }

        let result = annotate(
            input,
            &self.rules,
            AssignmentMethod::Heuristic,
            assignments,
            overflow,
            rejections,
        );
        info!(
            assigned = result.summary.assigned,
            overflowed = result.summary.overflowed,
            penalty = result.summary.total_penalty,
            "construction complete"
        );
        result
    }

    /// Picks the best feasible candidate under the configured objective.
    fn rank<'a>(
        &self,
        timelines: &Timelines<'_>,
        leg: &FlightLeg,
        mut feasible: Vec<(&'a AssignableAircraft, CandidateFit)>,
    ) -> Option<&'a AssignableAircraft> {
        match self.config.objective {
            Objective::MinimizeAircraft => {
                // Most legs already flown today, then tightest fit.
                feasible.sort_by_key(|(tail, fit)| {
                    (
                        std::cmp::Reverse(timelines.legs_on_date(&tail.registration, leg.date)),
                        fit.gap_to_previous,
                        tail.registration.clone(),
                    )
                });
            }
            Objective::BalanceUtilization => {
                // Least cumulative block time across the horizon, then tightest fit.
                feasible.sort_by_key(|(tail, fit)| {
                    (
                        timelines.block_minutes(&tail.registration),
                        fit.gap_to_previous,
                        tail.registration.clone(),
                    )
                });
            }
        }
        feasible.first().map(|(tail, _)| *tail)
    }
}

/// Final annotation pass shared by every engine: stands the violation map,
/// chain breaks, substitution markers, and summary up from a bare
/// assignment.
pub(crate) fn annotate(
    input: &AssignmentInput,
    rules: &RuleSet,
    method: AssignmentMethod,
    assignments: HashMap<FlightKey, String>,
    overflow: Vec<OverflowFlight>,
    rejections: HashMap<FlightKey, Vec<CandidateRejection>>,
) -> TailAssignmentResult {
    let fleet_by_registration = input.fleet_by_registration();
    let timelines = Timelines::from_assignments(&input.flights, &assignments);

    let mut result = TailAssignmentResult::new(method);
    result.overflow = overflow;
    result.rejections = rejections;

    let mut registrations: Vec<&str> = timelines.used_registrations().collect();
    registrations.sort_unstable();

    for registration in &registrations {
        let legs = timelines.legs(registration);
        for pair in legs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.overlaps(b) {
                // Only pinned legs can collide; the sweep checks everything else.
                for leg in [a, b] {
                    let other = if std::ptr::eq(leg, a) { b } else { a };
                    result.violations.entry(leg.key()).or_default().push(
                        RuleViolation {
                            rule: "pinned-overlap".to_string(),
                            message: format!(
                                "{} overlaps {} on {}",
                                leg.number, other.number, registration
                            ),
                            penalty: 0,
                        },
                    );
                }
            } else if !a.same_route(b) && a.arrival_station != b.departure_station {
                result.chain_breaks.push(ChainBreak {
                    registration: registration.to_string(),
                    from_flight: a.key(),
                    to_flight: b.key(),
                    arrival_station: a.arrival_station.clone(),
                    departure_station: b.departure_station.clone(),
                });
            }
        }

        let Some(tail) = fleet_by_registration.get(*registration) else {
            continue;
        };
        for &leg in legs {
            let context = RotationContext {
                previous_leg: timelines.previous_leg(registration, leg),
                next_leg: timelines.next_leg(registration, leg),
                legs_today: timelines.legs_on_date(registration, leg.date) - 1,
                block_minutes_today: timelines
                    .legs(registration)
                    .iter()
                    .filter(|l| l.date == leg.date)
                    .map(|l| l.block_minutes())
                    .sum::<i64>()
                    - leg.block_minutes(),
            };
            for triggered in rules.evaluate(leg, tail, &context) {
                // A hard trigger here can only come from a pin; it is
                // surfaced at zero penalty rather than silently dropped.
                let penalty = match triggered.enforcement {
                    Enforcement::Hard => 0,
                    Enforcement::Soft { penalty } => penalty,
                };
                result
                    .violations
                    .entry(leg.key())
                    .or_default()
                    .push(RuleViolation {
                        rule: triggered.rule,
                        message: triggered.message,
                        penalty,
                    });
            }

            if tail.aircraft_type != leg.aircraft_type {
                result.substitutions.insert(
                    leg.key(),
                    FamilySubstitution {
                        flight: leg.key(),
                        scheduled_type: leg.aircraft_type.clone(),
                        assigned_type: tail.aircraft_type.clone(),
                    },
                );
            }
        }
    }

    result.assignments = assignments;
    result.recompute_summary();
    result
}
