//! Scheduling rules and the ordered rule set.
//!
//! Operator-defined rules judge a candidate (flight, aircraft) pairing.
//! A hard rule eliminates the candidate outright; a soft rule lets it
//! stand but adds a penalty cost. Rules are evaluated in configured
//! priority order and each decides its own applicability.
//!
//! A flight's final violation list reflects the rules triggered by its
//! *actual* assigned aircraft, not by every candidate considered.

pub mod builtin;

use std::fmt::Debug;
use std::sync::Arc;

use crate::models::{AssignableAircraft, FlightLeg};

/// How a triggered rule is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// The candidate must be excluded from consideration.
    Hard,
    /// The candidate stays eligible at a penalty cost.
    Soft { penalty: i64 },
}

/// A rule that fired for a candidate pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggeredRule {
    /// Name of the rule.
    pub rule: String,
    /// How the rule is enforced.
    pub enforcement: Enforcement,
    /// Human-readable description of the violation.
    pub message: String,
}

impl TriggeredRule {
    /// Penalty contributed by this trigger (0 for hard rules).
    pub fn penalty(&self) -> i64 {
        match self.enforcement {
            Enforcement::Hard => 0,
            Enforcement::Soft { penalty } => penalty,
        }
    }
}

/// Rotation state surrounding a candidate assignment, as known to the
/// evaluating engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationContext<'a> {
    /// The candidate tail's most recent leg ending before this flight.
    pub previous_leg: Option<&'a FlightLeg>,
    /// The candidate tail's next leg after this flight, when already known
    /// (pinned legs placed ahead of the sweep).
    pub next_leg: Option<&'a FlightLeg>,
    /// Legs already on the candidate tail on this flight's date.
    pub legs_today: usize,
    /// Block minutes already assigned to the candidate tail on this date.
    pub block_minutes_today: i64,
}

/// An operator-defined scheduling rule.
pub trait ScheduleRule: Send + Sync + Debug {
    /// Rule name (stable identifier, e.g. "international-capability").
    fn name(&self) -> &'static str;

    /// Judges the pairing; `None` when the rule does not apply or is
    /// satisfied.
    fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        context: &RotationContext<'_>,
    ) -> Option<TriggeredRule>;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// An ordered set of scheduling rules.
///
/// Evaluation order follows insertion order; operators configure rules
/// from highest to lowest priority.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn ScheduleRule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the end of the evaluation order.
    pub fn with_rule<R: ScheduleRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every rule against a pairing, in priority order.
    pub fn evaluate(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        context: &RotationContext<'_>,
    ) -> Vec<TriggeredRule> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(flight, aircraft, context))
            .collect()
    }

    /// The first hard trigger for a pairing, if any. Engines use this to
    /// reject a candidate without collecting the remaining soft triggers.
    pub fn first_hard(
        &self,
        flight: &FlightLeg,
        aircraft: &AssignableAircraft,
        context: &RotationContext<'_>,
    ) -> Option<TriggeredRule> {
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(flight, aircraft, context))
            .find(|t| t.enforcement == Enforcement::Hard)
    }
}

impl Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
