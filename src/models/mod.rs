//! Tail-assignment domain models.
//!
//! Provides the core data types for representing the assignment problem
//! and its solutions: dated flight legs, assignable aircraft, directional
//! turnaround minimums, persisted manual overrides, and the single result
//! shape every engine produces.
//!
//! # Domain Mappings
//!
//! | tailsched | Airline operations |
//! |-----------|--------------------|
//! | FlightLeg | One scheduled departure on one calendar date |
//! | AssignableAircraft | A physical tail, identified by registration |
//! | TatTable | Minimum ground times between arrival and next departure |
//! | ManualOverrides | Dispatcher-pinned (flight, date) → tail decisions |
//! | TailAssignmentResult | A complete rotation plan with diagnostics |

mod aircraft;
mod flight;
mod overrides;
mod result;
mod tat;

pub use aircraft::{AircraftStatus, AssignableAircraft, FamilyMap};
pub use flight::{FlightKey, FlightLeg, MINUTES_PER_DAY};
pub use overrides::ManualOverrides;
pub use result::{
    AssignmentMethod, AssignmentSummary, CandidateRejection, ChainBreak, ChainConflictDetail,
    FamilySubstitution, OverflowFlight, RejectionReason, RuleViolation, TailAssignmentResult,
};
pub use tat::{AircraftTypeTat, DirectionalMinutes, TatCase, TatOverride, TatTable};
