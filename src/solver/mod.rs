//! Remote MIP solver integration.
//!
//! The exact solver is an externally hosted service with a narrow
//! contract: it receives the same flight/fleet/TAT/family inputs as the
//! local engines plus pinned-flight constraints and a time/optimality-gap
//! budget, and returns an assignment in its own status vocabulary
//! (optimal / feasible / infeasible / error). This module serializes the
//! request, drives the HTTP exchange, and folds the response into the
//! same `TailAssignmentResult` shape the local engines produce.
//!
//! A failed or cancelled remote call never leaves the session
//! result-less: `AssignmentSession` restores the previously active
//! method and result.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::constructor::{annotate, AssignmentInput};
use crate::models::{
    AssignmentMethod, FlightKey, OverflowFlight, TailAssignmentResult,
};
use crate::refiner::CancellationToken;
use crate::rules::RuleSet;

/// Errors from the remote solve path.
///
/// Never fatal to the session: the caller keeps its last known-good
/// assignment and surfaces the message as a notification.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The HTTP exchange failed (connect, timeout, or decode).
    #[error("solver transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The solver reported an error status.
    #[error("solver reported an error: {message}")]
    Remote { message: String },
    /// The caller cancelled before a result was adopted.
    #[error("solve cancelled before completion")]
    Cancelled,
}

/// Time and optimality budget for one solve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolveBudget {
    /// Wall-clock budget the solver must respect; also the HTTP timeout.
    pub time_budget_secs: u64,
    /// Relative MIP gap at which the solver may stop (e.g. 0.01).
    pub optimality_gap: f64,
}

impl Default for SolveBudget {
    fn default() -> Self {
        Self {
            time_budget_secs: 60,
            optimality_gap: 0.01,
        }
    }
}

/// A pinned (flight, date) → registration constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedAssignment {
    pub flight: FlightKey,
    pub registration: String,
}

/// The serialized solve request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub flights: Vec<crate::models::FlightLeg>,
    pub fleet: Vec<crate::models::AssignableAircraft>,
    pub tat: crate::models::TatTable,
    pub families: crate::models::FamilyMap,
    pub pins: Vec<PinnedAssignment>,
    pub budget: SolveBudget,
    /// Whether the solver may substitute within families.
    pub family_substitution: bool,
}

impl SolveRequest {
    /// Builds a request from an engine input, deriving pins from the legs.
    pub fn from_input(
        input: &AssignmentInput,
        budget: SolveBudget,
        family_substitution: bool,
    ) -> Self {
        let pins = input
            .flights
            .iter()
            .filter_map(|leg| {
                leg.pinned_registration.as_ref().map(|registration| {
                    PinnedAssignment {
                        flight: leg.key(),
                        registration: registration.clone(),
                    }
                })
            })
            .collect();
        Self {
            flights: input.flights.clone(),
            fleet: input.fleet.clone(),
            tat: input.tat.clone(),
            families: input.families.clone(),
            pins,
            budget,
            family_substitution,
        }
    }
}

/// The solver's own result vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverStatus {
    /// Proven optimal within the gap.
    Optimal,
    /// Feasible but not proven optimal inside the budget.
    Feasible,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The solver failed.
    Error,
}

/// One assignment row in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedAssignment {
    pub flight: FlightKey,
    pub registration: String,
}

/// The serialized solve response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub status: SolverStatus,
    #[serde(default)]
    pub assignments: Vec<SolvedAssignment>,
    #[serde(default)]
    pub unassigned: Vec<FlightKey>,
    /// Solver-side diagnostics.
    pub elapsed_ms: u64,
    pub variable_count: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// The remote solver contract.
pub trait SolverClient {
    /// Runs one solve within the request's budget.
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolverError>;
}

/// HTTP client for the hosted solver.
pub struct HttpSolverClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSolverClient {
    /// Creates a client for a solver endpoint. The timeout should cover
    /// the solve budget plus transfer overhead.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SolverError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

impl SolverClient for HttpSolverClient {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolverError> {
        let url = format!("{}/solve", self.base_url.trim_end_matches('/'));
        info!(
            %url,
            flights = request.flights.len(),
            fleet = request.fleet.len(),
            budget_secs = request.budget.time_budget_secs,
            "dispatching remote solve"
        );
        let response = self
            .client
            .post(url)
            .json(request)
            .send()?
            .error_for_status()?
            .json::<SolveResponse>()?;
        Ok(response)
    }
}

/// Folds a solver response into the engine result shape.
///
/// Every input flight lands in exactly one of assignments and overflow,
/// whatever the response contains; an `Error` status is returned as
/// `SolverError::Remote`. Violations, chain breaks, and substitution
/// markers are re-derived locally so downstream consumers see the same
/// diagnostics regardless of which engine produced the assignment.
pub fn map_response(
    input: &AssignmentInput,
    rules: &RuleSet,
    response: &SolveResponse,
) -> Result<TailAssignmentResult, SolverError> {
    if response.status == SolverStatus::Error {
        return Err(SolverError::Remote {
            message: response
                .message
                .clone()
                .unwrap_or_else(|| "unspecified solver failure".to_string()),
        });
    }

    let known: HashSet<FlightKey> = input.flights.iter().map(|leg| leg.key()).collect();
    let mut assignments = std::collections::HashMap::new();
    for row in &response.assignments {
        if known.contains(&row.flight) {
            assignments.insert(row.flight.clone(), row.registration.clone());
        } else {
            warn!(flight = %row.flight, "solver assigned an unknown flight; dropping");
        }
    }

    let overflow: Vec<OverflowFlight> = input
        .flights
        .iter()
        .filter(|leg| !assignments.contains_key(&leg.key()))
        .map(|leg| OverflowFlight {
            flight: leg.key(),
            aircraft_type: leg.aircraft_type.clone(),
        })
        .collect();

    Ok(annotate(
        input,
        rules,
        AssignmentMethod::Remote,
        assignments,
        overflow,
        Default::default(),
    ))
}

/// Holds the session's active assignment and guards remote solves.
///
/// On any failure or cancellation the previously active method and
/// result stay in place.
#[derive(Debug, Default)]
pub struct AssignmentSession {
    current: Option<TailAssignmentResult>,
}

impl AssignmentSession {
    /// Creates a session with no assignment yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a locally produced result (constructor or refiner).
    pub fn adopt(&mut self, result: TailAssignmentResult) {
        self.current = Some(result);
    }

    /// The active result, if any.
    pub fn current(&self) -> Option<&TailAssignmentResult> {
        self.current.as_ref()
    }

    /// Runs a remote solve and adopts its result.
    ///
    /// On transport failure, solver error, or cancellation the prior
    /// result is untouched and the error is returned for notification.
    pub fn run_remote(
        &mut self,
        client: &dyn SolverClient,
        input: &AssignmentInput,
        rules: &RuleSet,
        budget: SolveBudget,
        family_substitution: bool,
        token: &CancellationToken,
    ) -> Result<&TailAssignmentResult, SolverError> {
        if token.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        let request = SolveRequest::from_input(input, budget, family_substitution);
        let response = client.solve(&request)?;
        if token.is_cancelled() {
            // The response arrived after the user gave up; keep the prior
            // result active.
            return Err(SolverError::Cancelled);
        }
        let result = map_response(input, rules, &response)?;
        info!(
            status = ?response.status,
            assigned = result.summary.assigned,
            overflowed = result.summary.overflowed,
            solver_elapsed_ms = response.elapsed_ms,
            variables = response.variable_count,
            "adopted remote solve"
        );
        Ok(self.current.insert(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignableAircraft, FlightLeg};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
    }

    fn key(id: &str) -> FlightKey {
        FlightKey::new(id, date())
    }

    fn input() -> AssignmentInput {
        AssignmentInput::new(
            vec![
                FlightLeg::new("A", "OSL", "TRD", 480, 540, date()).with_aircraft_type("DH8D"),
                FlightLeg::new("B", "TRD", "BOO", 600, 660, date()).with_aircraft_type("DH8D"),
            ],
            vec![AssignableAircraft::new("LN-WDA", "DH8D")],
        )
    }

    struct StubClient(Result<SolveResponse, &'static str>);

    impl SolverClient for StubClient {
        fn solve(&self, _request: &SolveRequest) -> Result<SolveResponse, SolverError> {
            match &self.0 {
                Ok(response) => Ok(response.clone()),
                Err(message) => Err(SolverError::Remote {
                    message: message.to_string(),
                }),
            }
        }
    }

    fn optimal_response() -> SolveResponse {
        SolveResponse {
            status: SolverStatus::Optimal,
            assignments: vec![
                SolvedAssignment {
                    flight: key("A"),
                    registration: "LN-WDA".to_string(),
                },
                SolvedAssignment {
                    flight: key("B"),
                    registration: "LN-WDA".to_string(),
                },
            ],
            unassigned: vec![],
            elapsed_ms: 412,
            variable_count: 96,
            message: None,
        }
    }

    #[test]
    fn test_request_derives_pins_from_legs() {
        let mut engine_input = input();
        engine_input.flights[0] = engine_input.flights[0]
            .clone()
            .with_pinned_registration("LN-WDA");

        let request = SolveRequest::from_input(&engine_input, SolveBudget::default(), false);
        assert_eq!(request.pins.len(), 1);
        assert_eq!(request.pins[0].flight, key("A"));
        assert_eq!(request.pins[0].registration, "LN-WDA");
    }

    #[test]
    fn test_request_round_trips_through_json() {
        let request = SolveRequest::from_input(&input(), SolveBudget::default(), true);
        let json = serde_json::to_string(&request).unwrap();
        let back: SolveRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.flights.len(), 2);
        assert!(back.family_substitution);
        assert_eq!(back.budget.time_budget_secs, 60);
    }

    #[test]
    fn test_map_optimal_response() {
        let result = map_response(&input(), &RuleSet::new(), &optimal_response()).unwrap();
        assert_eq!(result.method, AssignmentMethod::Remote);
        assert_eq!(result.registration_for(&key("A")), Some("LN-WDA"));
        assert_eq!(result.summary.assigned, 2);
        assert_eq!(result.summary.overflowed, 0);
    }

    #[test]
    fn test_map_infeasible_overflows_everything() {
        let response = SolveResponse {
            status: SolverStatus::Infeasible,
            assignments: vec![],
            unassigned: vec![key("A"), key("B")],
            elapsed_ms: 90,
            variable_count: 96,
            message: None,
        };
        let result = map_response(&input(), &RuleSet::new(), &response).unwrap();
        assert!(result.assignments.is_empty());
        assert_eq!(result.summary.overflowed, 2);
    }

    #[test]
    fn test_map_partial_response_keeps_partition() {
        // A response missing a flight entirely still lands it in overflow.
        let mut response = optimal_response();
        response.status = SolverStatus::Feasible;
        response.assignments.pop();

        let result = map_response(&input(), &RuleSet::new(), &response).unwrap();
        assert_eq!(result.summary.assigned, 1);
        assert!(result.is_overflowed(&key("B")));
    }

    #[test]
    fn test_map_error_status() {
        let response = SolveResponse {
            status: SolverStatus::Error,
            assignments: vec![],
            unassigned: vec![],
            elapsed_ms: 10,
            variable_count: 0,
            message: Some("license expired".to_string()),
        };
        let error = map_response(&input(), &RuleSet::new(), &response).unwrap_err();
        assert!(matches!(error, SolverError::Remote { .. }));
        assert!(error.to_string().contains("license expired"));
    }

    #[test]
    fn test_session_restores_prior_result_on_failure() {
        let engine_input = input();
        let rules = RuleSet::new();
        let mut session = AssignmentSession::new();

        let good = StubClient(Ok(optimal_response()));
        session
            .run_remote(
                &good,
                &engine_input,
                &rules,
                SolveBudget::default(),
                false,
                &CancellationToken::new(),
            )
            .unwrap();
        let adopted = session.current().unwrap().assignments.clone();

        let bad = StubClient(Err("backend offline"));
        let error = session
            .run_remote(
                &bad,
                &engine_input,
                &rules,
                SolveBudget::default(),
                false,
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(error, SolverError::Remote { .. }));
        // The previously adopted result is still active.
        assert_eq!(session.current().unwrap().assignments, adopted);
    }

    #[test]
    fn test_session_cancellation_keeps_prior_result() {
        let engine_input = input();
        let rules = RuleSet::new();
        let mut session = AssignmentSession::new();
        let token = CancellationToken::new();
        token.cancel();

        let client = StubClient(Ok(optimal_response()));
        let error = session
            .run_remote(
                &client,
                &engine_input,
                &rules,
                SolveBudget::default(),
                false,
                &token,
            )
            .unwrap_err();
        assert!(matches!(error, SolverError::Cancelled));
        assert!(session.current().is_none());
    }

    #[test]
    fn test_status_vocabulary_serde() {
        assert_eq!(
            serde_json::to_string(&SolverStatus::Optimal).unwrap(),
            "\"optimal\""
        );
        let status: SolverStatus = serde_json::from_str("\"infeasible\"").unwrap();
        assert_eq!(status, SolverStatus::Infeasible);
    }
}
