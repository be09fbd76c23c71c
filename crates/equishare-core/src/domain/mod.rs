//! Domain model for portfolio reassignment
//!
//! - `RawRecord`: one debt row as supplied by the input collaborator
//! - `ClientRecord`: the per-client decision unit after aggregation
//! - `PartySet`: the ordered receiving parties of a batch
//! - `Assignment`: the write-once client → party mapping
//! - `RelaxationLevel`: one tolerance/zone configuration of the cascade

mod assignment;
mod party;
mod record;
mod relaxation;


pub use assignment::{Assignment, AssignmentMethod};
pub use party::PartySet;
pub use record::{ClientRecord, RawRecord};
pub use relaxation::RelaxationLevel;
