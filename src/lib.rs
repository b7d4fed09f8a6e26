#![warn(warnings)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::needless_return)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

//! Column generation with soft fixing for the one-dimensional
//! cutting-stock / set-covering problem.
//!
//! The restricted master problem minimizes the number of stock rolls
//! over a growing pool of cutting patterns; a bounded-knapsack pricing
//! oracle discovers new patterns, and a family of seven soft-fixing
//! strategies temporarily restricts the feasible region around the last
//! integer solution to intensify the search. An adaptive alpha schedule
//! drives the outer loop to termination.
//!
//! The actual LP/IP solving is delegated to a backend implementing
//! [`LpSolver`]; see [`solvers`].

pub mod error;
pub mod instance;
pub mod model;
pub mod solvers;

mod colgen;
mod master;
mod orchestrator;
mod pricing;
mod schedule;
mod soft_fixing;

pub mod generator;
pub mod report;
pub mod ui;

pub use error::Error;
pub use instance::Instance;
pub use model::{
    ConstrId, Domain, LinearModel, LpSolver, Relation, Sense, Solution, SolveStatus, VarId,
};

pub use colgen::{CgExit, CgStep};
pub use master::{Master, PatternMatrix};
pub use orchestrator::{
    IterationStats, Orchestrator, RunConfig, RunSummary, Selector, Termination,
};
pub use pricing::PricingOracle;
pub use schedule::{Schedule, ScheduleSignal};
pub use soft_fixing::{AppliedFixing, SoftFixing};

/// Numeric tolerance for the reduced-cost test (`value > 1 + EPSILON`
/// marks an improving column) and for the alpha-floor comparison of the
/// adaptive schedule. Both loops terminate against this constant, so
/// changing it changes convergence behavior.
pub const EPSILON: f64 = 1e-4;
