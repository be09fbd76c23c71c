//! Score types for measuring constraint violation
//!
//! A score compares two candidate assignments. All score types are
//! immutable and support the arithmetic the local search needs.

mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use simple::SimpleScore;
pub use traits::Score;
