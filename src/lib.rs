//! Tail-assignment engine for airline schedules.
//!
//! Assigns physical aircraft ("tails") to dated flight legs over a rolling
//! horizon, subject to minimum turnaround times (TAT), station continuity,
//! and operator-defined scheduling rules. Manual per-flight overrides are
//! authoritative and pin their flight for every engine in this crate.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `FlightLeg`, `FlightKey`, `AssignableAircraft`,
//!   `TatTable`, `ManualOverrides`, `TailAssignmentResult`
//! - **`conflict`**: Pure ground-time gap evaluation against the TAT table
//! - **`rules`**: Hard/soft scheduling rules and the ordered rule set
//! - **`constructor`**: Greedy/balanced single-sweep assignment construction
//! - **`refiner`**: Cancellable simulated-annealing improvement pass
//! - **`swap`**: All-or-nothing feasibility check for exchanging leg groups
//! - **`solver`**: Remote MIP solver contract and result mapping
//! - **`validation`**: Input integrity checks, including malformed overrides
//!
//! # Architecture
//!
//! Construction and evaluation are synchronous pure functions of their
//! inputs; the refiner is the single long-running operation and polls an
//! explicit cancellation token. The remote solver is an out-of-process
//! collaborator whose response is folded into the same `TailAssignmentResult`
//! shape the local engines produce, so consumers never distinguish the source
//! of an assignment.
//!
//! # References
//!
//! - Grönkvist (2005), "The Tail Assignment Problem"
//! - Gopalan & Talluri (1998), "The Aircraft Maintenance Routing Problem"
//! - Barnhart et al. (1998), "Flight String Models for Aircraft Fleeting and Routing"

pub mod conflict;
pub mod constructor;
pub mod models;
pub mod refiner;
pub mod rules;
pub mod solver;
pub mod swap;
pub mod validation;

mod timeline;
