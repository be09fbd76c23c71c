//! EquiShare Core - Core types for equitable portfolio reassignment
//!
//! This crate provides the fundamental abstractions for EquiShare:
//! - Score types for measuring constraint violation
//! - Domain types for records, clients, parties and assignments
//! - The error type shared by every EquiShare crate

pub mod domain;
pub mod error;
pub mod score;

pub use domain::{
    Assignment, AssignmentMethod, ClientRecord, PartySet, RawRecord, RelaxationLevel,
};
pub use error::{EquiShareError, Result};
pub use score::{Score, SimpleScore};
