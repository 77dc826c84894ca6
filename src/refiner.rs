//! Simulated-annealing refinement.
//!
//! Takes a constructor result as its starting point and searches for
//! lower-cost assignments by local perturbation: reassigning one
//! non-pinned flight, or swapping the tails of two non-pinned flights.
//! Worsening moves are accepted by the Metropolis criterion under a
//! geometric cooling schedule, shifting the search from exploratory to
//! greedy as the temperature drops.
//!
//! The refiner is the one long-running operation in this crate. It polls
//! a cancellation token at the top of every iteration and always returns
//! the best complete assignment found so far — never a regression from
//! its input, never a partially-mutated state. Progress is reported at a
//! throttled cadence so a UI can render it without flooding its event
//! loop.
//!
//! # Reference
//! Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constructor::{annotate, check_candidate, AssignmentConfig, AssignmentInput, Objective};
use crate::models::{
    AssignableAircraft, AssignmentMethod, FlightKey, FlightLeg, OverflowFlight,
    TailAssignmentResult,
};
use crate::rules::{RotationContext, RuleSet};
use crate::timeline::Timelines;

/// Cost of one overflowed flight. Dominates every other term so the
/// search always prefers placing flights over polishing penalties.
const OVERFLOW_WEIGHT: f64 = 10_000.0;

/// Cost per tail in use under the minimize objective.
const TAIL_WEIGHT: f64 = 50.0;

/// Iterations between progress reports.
const PROGRESS_INTERVAL: u64 = 256;

/// Iteration budget and cooling schedule presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnealingPreset {
    /// Short interactive pass.
    Quick,
    /// Default budget.
    #[default]
    Normal,
    /// Overnight-quality search.
    Deep,
}

impl AnnealingPreset {
    /// Iteration budget.
    pub fn iterations(&self) -> u64 {
        match self {
            AnnealingPreset::Quick => 2_000,
            AnnealingPreset::Normal => 10_000,
            AnnealingPreset::Deep => 50_000,
        }
    }

    /// Starting temperature.
    pub fn initial_temperature(&self) -> f64 {
        match self {
            AnnealingPreset::Quick => 500.0,
            AnnealingPreset::Normal => 1_000.0,
            AnnealingPreset::Deep => 2_000.0,
        }
    }

    /// Geometric decay factor applied every iteration.
    pub fn cooling_rate(&self) -> f64 {
        match self {
            AnnealingPreset::Quick => 0.997,
            AnnealingPreset::Normal => 0.9995,
            AnnealingPreset::Deep => 0.9999,
        }
    }

    /// Temperature under which worsening moves are no longer accepted.
    pub fn minimum_temperature(&self) -> f64 {
        0.01
    }
}

/// Cooperative cancellation signal shared between the caller and a
/// running refinement.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// One throttled progress report.
#[derive(Debug, Clone, Copy)]
pub struct RefinementProgress {
    /// Iterations completed.
    pub iteration: u64,
    /// The preset's iteration budget.
    pub total_iterations: u64,
    /// Cost of the current assignment.
    pub cost: f64,
    /// Cost of the best assignment found so far.
    pub best_cost: f64,
    /// Current temperature.
    pub temperature: f64,
    /// Wall time since the run started.
    pub elapsed: Duration,
}

/// A local move under evaluation.
enum Move {
    Reassign {
        flight: usize,
        to: String,
        /// Previous tail, `None` when the flight came from overflow.
        from: Option<String>,
    },
    Swap {
        flight_a: usize,
        flight_b: usize,
        registration_a: String,
        registration_b: String,
    },
}

/// Simulated-annealing refiner.
#[derive(Debug, Clone, Default)]
pub struct Refiner {
    preset: AnnealingPreset,
    config: AssignmentConfig,
    rules: RuleSet,
    seed: u64,
}

impl Refiner {
    /// Creates a refiner with a preset and engine configuration.
    pub fn new(preset: AnnealingPreset, config: AssignmentConfig) -> Self {
        Self {
            preset,
            config,
            rules: RuleSet::new(),
            seed: 0x5eed,
        }
    }

    /// Sets the operator rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the RNG seed, making the run reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Refines a starting assignment.
    ///
    /// Returns the best assignment found, which is never costlier than the
    /// input — including when the token fires mid-run.
    pub fn refine(
        &self,
        input: &AssignmentInput,
        start: &TailAssignmentResult,
        token: &CancellationToken,
        mut on_progress: impl FnMut(RefinementProgress),
    ) -> TailAssignmentResult {
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut state = SearchState::from_result(input, start);
        let mut cost = self.cost(input, &state);
        let mut best_assignments = state.assignments.clone();
        let mut best_cost = cost;

        // Indices of flights the search may move.
        let movable: Vec<usize> = input
            .flights
            .iter()
            .enumerate()
            .filter(|(_, leg)| leg.pinned_registration.is_none())
            .map(|(i, _)| i)
            .collect();

        let total_iterations = self.preset.iterations();
        let mut temperature = self.preset.initial_temperature();
        let minimum = self.preset.minimum_temperature();

        let mut iteration = 0;
        while iteration < total_iterations {
            if token.is_cancelled() {
                debug!(iteration, best_cost, "refinement cancelled");
                break;
            }
            iteration += 1;

            if let Some(proposed) = self.propose(input, &mut state, &movable, &mut rng) {
                let candidate_cost = self.cost(input, &state);
                let delta = candidate_cost - cost;
                if self.accept(delta, temperature, minimum, &mut rng) {
                    cost = candidate_cost;
                    if cost < best_cost {
                        best_cost = cost;
                        best_assignments = state.assignments.clone();
                        debug!(iteration, best_cost, "new incumbent");
                    }
                } else {
                    state.undo(input, &proposed);
                }
            }

            temperature *= self.preset.cooling_rate();
            if iteration % PROGRESS_INTERVAL == 0 {
                on_progress(RefinementProgress {
                    iteration,
                    total_iterations,
                    cost,
                    best_cost,
                    temperature,
                    elapsed: started.elapsed(),
                });
            }
        }

        on_progress(RefinementProgress {
            iteration,
            total_iterations,
            cost,
            best_cost,
            temperature,
            elapsed: started.elapsed(),
        });
        info!(
            iteration,
            best_cost,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refinement finished"
        );

        let assigned: HashSet<FlightKey> = best_assignments.keys().cloned().collect();
        let overflow: Vec<OverflowFlight> = input
            .flights
            .iter()
            .filter(|leg| !assigned.contains(&leg.key()))
            .map(|leg| OverflowFlight {
                flight: leg.key(),
                aircraft_type: leg.aircraft_type.clone(),
            })
            .collect();
        annotate(
            input,
            &self.rules,
            AssignmentMethod::Annealed,
            best_assignments,
            overflow,
            start.rejections.clone(),
        )
    }

    /// Proposes and applies one random move. Returns `None` when no
    /// feasible move was found this iteration.
    fn propose<'a>(
        &self,
        input: &'a AssignmentInput,
        state: &mut SearchState<'a>,
        movable: &[usize],
        rng: &mut StdRng,
    ) -> Option<Move> {
        if movable.is_empty() {
            return None;
        }
        if rng.random_bool(0.7) {
            self.propose_reassign(input, state, movable, rng)
        } else {
            self.propose_swap(input, state, movable, rng)
                .or_else(|| self.propose_reassign(input, state, movable, rng))
        }
    }

    fn propose_reassign<'a>(
        &self,
        input: &'a AssignmentInput,
        state: &mut SearchState<'a>,
        movable: &[usize],
        rng: &mut StdRng,
    ) -> Option<Move> {
        let flight = movable[rng.random_range(0..movable.len())];
        let leg = &input.flights[flight];
        let key = leg.key();
        let from = state.assignments.get(&key).cloned();

        let mut candidates: Vec<&AssignableAircraft> = input
            .fleet
            .iter()
            .filter(|tail| tail.is_assignable())
            .filter(|tail| Some(&tail.registration) != from.as_ref())
            .filter(|tail| {
                tail.aircraft_type == leg.aircraft_type
                    || (self.config.family_substitution
                        && input
                            .families
                            .same_family(&tail.aircraft_type, &leg.aircraft_type))
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| a.registration.cmp(&b.registration));
        let tail = candidates[rng.random_range(0..candidates.len())];

        if let Some(ref registration) = from {
            state.remove(registration, leg);
        }
        match check_candidate(leg, tail, &state.timelines, &input.tat, &self.rules) {
            Ok(_) => {
                state.place(&tail.registration, leg);
                Some(Move::Reassign {
                    flight,
                    to: tail.registration.clone(),
                    from,
                })
            }
            Err(_) => {
                if let Some(ref registration) = from {
                    state.place(registration, leg);
                }
                None
            }
        }
    }

    fn propose_swap<'a>(
        &self,
        input: &'a AssignmentInput,
        state: &mut SearchState<'a>,
        movable: &[usize],
        rng: &mut StdRng,
    ) -> Option<Move> {
        let assigned: Vec<usize> = movable
            .iter()
            .copied()
            .filter(|&i| state.assignments.contains_key(&input.flights[i].key()))
            .collect();
        if assigned.len() < 2 {
            return None;
        }
        let flight_a = assigned[rng.random_range(0..assigned.len())];
        let flight_b = assigned[rng.random_range(0..assigned.len())];
        let leg_a = &input.flights[flight_a];
        let leg_b = &input.flights[flight_b];
        let registration_a = state.assignments.get(&leg_a.key()).cloned()?;
        let registration_b = state.assignments.get(&leg_b.key()).cloned()?;
        if flight_a == flight_b || registration_a == registration_b {
            return None;
        }
        let tail_a = input.fleet.iter().find(|t| t.registration == registration_a)?;
        let tail_b = input.fleet.iter().find(|t| t.registration == registration_b)?;

        // Types must still be compatible after the exchange.
        for (leg, tail) in [(leg_a, tail_b), (leg_b, tail_a)] {
            let compatible = tail.aircraft_type == leg.aircraft_type
                || (self.config.family_substitution
                    && input
                        .families
                        .same_family(&tail.aircraft_type, &leg.aircraft_type));
            if !compatible {
                return None;
            }
        }

        state.remove(&registration_a, leg_a);
        state.remove(&registration_b, leg_b);
        let a_fits = check_candidate(leg_a, tail_b, &state.timelines, &input.tat, &self.rules);
        let b_fits = check_candidate(leg_b, tail_a, &state.timelines, &input.tat, &self.rules);
        if a_fits.is_ok() && b_fits.is_ok() {
            state.place(&registration_b, leg_a);
            state.place(&registration_a, leg_b);
            Some(Move::Swap {
                flight_a,
                flight_b,
                registration_a,
                registration_b,
            })
        } else {
            state.place(&registration_a, leg_a);
            state.place(&registration_b, leg_b);
            None
        }
    }

    /// Metropolis acceptance under the current temperature.
    fn accept(&self, delta: f64, temperature: f64, minimum: f64, rng: &mut StdRng) -> bool {
        if delta < 0.0 {
            return true;
        }
        if temperature <= minimum {
            return false;
        }
        let probability = (-delta / temperature).exp().clamp(0.0, 1.0);
        rng.random_bool(probability)
    }

    /// Scalar cost of the current state: overflow dominates, then soft
    /// penalties, then the objective's idle/imbalance term.
    fn cost(&self, input: &AssignmentInput, state: &SearchState<'_>) -> f64 {
        let overflowed = input.flights.len() - state.assignments.len();
        let mut total = overflowed as f64 * OVERFLOW_WEIGHT;
        total += self.soft_penalty(input, state) as f64;
        total += match self.config.objective {
            Objective::MinimizeAircraft => {
                state.timelines.used_registrations().count() as f64 * TAIL_WEIGHT
            }
            Objective::BalanceUtilization => {
                let blocks: Vec<f64> = input
                    .fleet
                    .iter()
                    .filter(|tail| tail.is_assignable())
                    .map(|tail| state.timelines.block_minutes(&tail.registration) as f64)
                    .collect();
                standard_deviation(&blocks)
            }
        };
        total
    }

    fn soft_penalty(&self, input: &AssignmentInput, state: &SearchState<'_>) -> i64 {
        let fleet_by_registration = input.fleet_by_registration();
        let mut penalty = 0;
        for registration in state.timelines.used_registrations() {
            let Some(tail) = fleet_by_registration.get(registration) else {
                continue;
            };
            for &leg in state.timelines.legs(registration) {
                let context = RotationContext {
                    previous_leg: state.timelines.previous_leg(registration, leg),
                    next_leg: state.timelines.next_leg(registration, leg),
                    legs_today: state.timelines.legs_on_date(registration, leg.date) - 1,
                    block_minutes_today: state
                        .timelines
                        .legs(registration)
                        .iter()
                        .filter(|l| l.date == leg.date)
                        .map(|l| l.block_minutes())
                        .sum::<i64>()
                        - leg.block_minutes(),
                };
                penalty += self
                    .rules
                    .evaluate(leg, tail, &context)
                    .iter()
                    .map(|t| t.penalty())
                    .sum::<i64>();
            }
        }
        penalty
    }
}

/// Mutable search state: the assignment map plus its timeline index.
struct SearchState<'a> {
    assignments: HashMap<FlightKey, String>,
    timelines: Timelines<'a>,
}

impl<'a> SearchState<'a> {
    fn from_result(input: &'a AssignmentInput, start: &TailAssignmentResult) -> Self {
        let assignments = start.assignments.clone();
        let timelines = Timelines::from_assignments(&input.flights, &assignments);
        Self {
            assignments,
            timelines,
        }
    }

    fn place(&mut self, registration: &str, leg: &'a FlightLeg) {
        self.assignments.insert(leg.key(), registration.to_string());
        self.timelines.insert(registration, leg);
    }

    fn remove(&mut self, registration: &str, leg: &FlightLeg) {
        self.assignments.remove(&leg.key());
        self.timelines.remove(registration, &leg.key());
    }

    fn undo(&mut self, input: &'a AssignmentInput, proposed: &Move) {
        match proposed {
            Move::Reassign { flight, to, from } => {
                let leg = &input.flights[*flight];
                self.remove(to, leg);
                if let Some(registration) = from {
                    self.place(registration, leg);
                }
            }
            Move::Swap {
                flight_a,
                flight_b,
                registration_a,
                registration_b,
            } => {
                let leg_a = &input.flights[*flight_a];
                let leg_b = &input.flights[*flight_b];
                self.remove(registration_b, leg_a);
                self.remove(registration_a, leg_b);
                self.place(registration_a, leg_a);
                self.place(registration_b, leg_b);
            }
        }
    }
}

fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// A refinement running on a worker thread.
///
/// Only one refinement is meaningful per session: starting a new job
/// implies cancelling the previous one first.
pub struct RefineJob {
    token: CancellationToken,
    handle: JoinHandle<TailAssignmentResult>,
    progress: Receiver<RefinementProgress>,
}

impl RefineJob {
    /// Spawns a refinement without blocking the caller.
    pub fn spawn(
        refiner: Refiner,
        input: AssignmentInput,
        start: TailAssignmentResult,
    ) -> Self {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let (sender, progress) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            refiner.refine(&input, &start, &worker_token, |report| {
                let _ = sender.send(report);
            })
        });
        Self {
            token,
            handle,
            progress,
        }
    }

    /// A clone of the job's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Requests cancellation; the job still returns its best result.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The throttled progress stream.
    pub fn progress(&self) -> &Receiver<RefinementProgress> {
        &self.progress
    }

    /// Waits for the job and returns its result.
    pub fn join(self) -> TailAssignmentResult {
        self.handle.join().expect("refinement thread panicked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::Constructor;
    use crate::models::{AircraftTypeTat, TatCase, TatTable};
    use crate::rules::builtin::MaxDailyLegs;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn leg(id: &str, from: &str, to: &str, dep: i64, arr: i64) -> FlightLeg {
        FlightLeg::new(id, from, to, dep, arr, date()).with_aircraft_type("DH8D")
    }

    fn tail(registration: &str) -> AssignableAircraft {
        AssignableAircraft::new(registration, "DH8D")
    }

    fn tat() -> TatTable {
        TatTable::new().with_type(AircraftTypeTat::new("DH8D", 30).with_scheduled(
            TatCase::DomDom,
            30,
        ))
    }

    fn rotation_input() -> AssignmentInput {
        AssignmentInput::new(
            vec![
                leg("A", "OSL", "TRD", 480, 540),
                leg("B", "TRD", "BOO", 600, 660),
                leg("C", "BOO", "TRD", 700, 760),
                leg("D", "TRD", "OSL", 820, 880),
                leg("E", "OSL", "TRD", 490, 550),
            ],
            vec![tail("LN-WDA"), tail("LN-WDB"), tail("LN-WDC")],
        )
        .with_tat(tat())
    }

    fn refiner() -> Refiner {
        Refiner::new(AnnealingPreset::Quick, AssignmentConfig::default()).with_seed(7)
    }

    fn cost_of(refiner: &Refiner, input: &AssignmentInput, result: &TailAssignmentResult) -> f64 {
        let state = SearchState::from_result(input, result);
        refiner.cost(input, &state)
    }

    #[test]
    fn test_refine_never_regresses() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        let refiner = refiner();

        let refined = refiner.refine(&input, &start, &CancellationToken::new(), |_| {});
        assert!(cost_of(&refiner, &input, &refined) <= cost_of(&refiner, &input, &start));
        assert_eq!(refined.method, AssignmentMethod::Annealed);
    }

    #[test]
    fn test_partition_invariant_after_refinement() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        let refined = refiner().refine(&input, &start, &CancellationToken::new(), |_| {});

        for flight in &input.flights {
            let key = flight.key();
            assert!(refined.assignments.contains_key(&key) != refined.is_overflowed(&key));
        }
    }

    #[test]
    fn test_pinned_flights_never_move() {
        let mut input = rotation_input();
        input.flights[0] = leg("A", "OSL", "TRD", 480, 540).with_pinned_registration("LN-WDC");
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        let refined = refiner().refine(&input, &start, &CancellationToken::new(), |_| {});

        assert_eq!(
            refined.registration_for(&FlightKey::new("A", date())),
            Some("LN-WDC")
        );
    }

    #[test]
    fn test_cancelled_token_returns_start_state() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        let token = CancellationToken::new();
        token.cancel();

        let refiner = refiner();
        let refined = refiner.refine(&input, &start, &token, |_| {});
        // Zero iterations ran; the result is the starting assignment.
        assert_eq!(refined.assignments, start.assignments);
        assert!(cost_of(&refiner, &input, &refined) <= cost_of(&refiner, &input, &start));
    }

    #[test]
    fn test_progress_is_throttled_and_final() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        let mut reports = Vec::new();
        refiner().refine(&input, &start, &CancellationToken::new(), |p| {
            reports.push(p)
        });

        let budget = AnnealingPreset::Quick.iterations();
        assert!(!reports.is_empty());
        assert!((reports.len() as u64) < budget / 2);
        let last = reports.last().unwrap();
        assert_eq!(last.iteration, budget);
        assert_eq!(last.total_iterations, budget);
        assert!(last.best_cost <= reports[0].best_cost);
    }

    #[test]
    fn test_refinement_reduces_soft_penalty() {
        // Start from a constructor run that packs four legs onto one tail
        // under a 2-leg cap; refinement can spread them across the fleet.
        let rules = RuleSet::new().with_rule(MaxDailyLegs::new(2, 100));
        let input = AssignmentInput::new(
            vec![
                leg("A", "OSL", "OSL", 480, 540).with_route("R1"),
                leg("B", "OSL", "OSL", 600, 660).with_route("R2"),
                leg("C", "OSL", "OSL", 720, 780).with_route("R3"),
                leg("D", "OSL", "OSL", 840, 900).with_route("R4"),
            ],
            vec![tail("LN-WDA"), tail("LN-WDB")],
        )
        .with_tat(tat());

        let start = Constructor::new(AssignmentConfig::default())
            .with_rules(rules.clone())
            .construct(&input);
        let refined = Refiner::new(AnnealingPreset::Normal, AssignmentConfig::default())
            .with_rules(rules)
            .with_seed(11)
            .refine(&input, &start, &CancellationToken::new(), |_| {});

        assert!(refined.summary.total_penalty <= start.summary.total_penalty);
    }

    #[test]
    fn test_refinement_rescues_overflow() {
        // Hand-degrade a feasible start by dropping one flight into
        // overflow; the search must place it back.
        let input = AssignmentInput::new(
            vec![
                leg("A", "OSL", "TRD", 480, 540),
                leg("B", "OSL", "BOO", 500, 560),
            ],
            vec![tail("LN-WDA"), tail("LN-WDB")],
        )
        .with_tat(tat());

        let start = Constructor::new(AssignmentConfig::default()).construct(&input);
        assert_eq!(start.summary.overflowed, 0);

        // Degrade the start by hand: drop B into overflow.
        let mut degraded = start.clone();
        degraded.assignments.remove(&FlightKey::new("B", date()));
        degraded.overflow.push(OverflowFlight {
            flight: FlightKey::new("B", date()),
            aircraft_type: "DH8D".to_string(),
        });
        degraded.recompute_summary();

        let refined = refiner().refine(&input, &degraded, &CancellationToken::new(), |_| {});
        assert_eq!(refined.summary.overflowed, 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);

        let first = refiner().refine(&input, &start, &CancellationToken::new(), |_| {});
        let second = refiner().refine(&input, &start, &CancellationToken::new(), |_| {});
        assert_eq!(first.assignments, second.assignments);
    }

    #[test]
    fn test_refine_job_runs_in_background() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);

        let job = RefineJob::spawn(refiner(), input.clone(), start.clone());
        let result = job.join();
        assert_eq!(result.method, AssignmentMethod::Annealed);
    }

    #[test]
    fn test_refine_job_cancel() {
        let input = rotation_input();
        let start = Constructor::new(AssignmentConfig::default()).construct(&input);

        let job = RefineJob::spawn(
            Refiner::new(AnnealingPreset::Deep, AssignmentConfig::default()).with_seed(3),
            input.clone(),
            start.clone(),
        );
        job.cancel();
        let result = job.join();
        // Cancellation still yields a complete, non-regressed assignment.
        for flight in &input.flights {
            let key = flight.key();
            assert!(result.assignments.contains_key(&key) != result.is_overflowed(&key));
        }
    }
}
