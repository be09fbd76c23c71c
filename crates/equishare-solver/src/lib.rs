//! EquiShare Solver
//!
//! A small constraint solver for assignment problems expressed as
//! linear constraints over boolean variables:
//! - `Model`: boolean variables, exactly-one groups, linear constraints
//! - `LinearSolver`: the solver capability the engine depends on
//! - `LocalSearchSolver`: presolve bound check plus parallel late
//!   acceptance local search under a wall-clock budget
//! - Acceptors and termination conditions used by the search

pub mod acceptor;
pub mod model;
pub mod scope;
pub mod solver;
pub mod statistics;
pub mod status;
pub mod termination;

mod director;
mod moves;
mod presolve;
mod search;

pub use acceptor::{Acceptor, LateAcceptanceAcceptor};
pub use model::{BoolVar, LinearConstraint, LinearExpr, Model, ModelError};
pub use scope::SearchScope;
pub use solver::{LinearSolver, LocalSearchSolver};
pub use statistics::{SolverStatistics, StatisticsCollector};
pub use status::{SolveOutcome, SolveParams, SolveStatus};
pub use termination::{
    BestScoreFeasibleTermination, ExternalTermination, OrTermination, StepCountTermination,
    Termination, TimeTermination,
};
