//! EquiShare - Equitable portfolio reassignment
//!
//! Reassigns clients among collection parties so that capital, account
//! counts and zone presence stay balanced while each party keeps only a
//! bounded share of the clients it already held.
//!
//! - [`aggregate()`]: raw rows to one record per client
//! - [`AssignmentEngine`]: small-batch dealing, relaxation cascade, fallback
//! - [`run_external`]: batching, locked rows and the final merge
//! - [`run_internal`]: advisor rotation per cohort and capital tier
//!
//! # Example
//!
//! ```
//! use equishare::prelude::*;
//!
//! let rows: Vec<RawRecord> = (0..6)
//!     .map(|i| RawRecord::new(format!("C{i}"), 1_000.0, "ESCALL", "NORTE"))
//!     .collect();
//! let config = EquiShareConfig::new().with_random_seed(7);
//!
//! let run = run_external(rows, &config, LocalSearchSolver::new()).unwrap();
//!
//! assert_eq!(run.rows.len(), 6);
//! assert_eq!(run.batches[0].method, AssignmentMethod::Direct);
//! ```

pub mod advisor;
pub mod aggregate;
pub mod batch;
pub mod cascade;
pub mod engine;
pub mod fallback;
pub mod merge;
pub mod model_builder;

pub use advisor::{run_internal, InternalRun, Placement, TierReport};
pub use aggregate::{aggregate, prepare};
pub use batch::{run_external, run_with_engine, BatchReport, ExternalRun};
pub use cascade::{run_cascade, CascadeOutcome, LevelAttempt};
pub use engine::{AssignmentEngine, EngineResult};
pub use fallback::round_robin;
pub use merge::{AssignedRecord, MergeOutcome, ResultMerger};
pub use model_builder::{BatchModel, ConstraintModelBuilder};

pub mod prelude {
    pub use super::{run_external, run_internal, AssignmentEngine, ExternalRun, InternalRun};
    pub use equishare_config::{BatchMode, EquiShareConfig};
    pub use equishare_core::{
        Assignment, AssignmentMethod, ClientRecord, EquiShareError, PartySet, RawRecord,
        RelaxationLevel,
    };
    pub use equishare_solver::{LinearSolver, LocalSearchSolver};
}
