//! Shared test fixtures for EquiShare crates.
//!
//! - [`records`] - raw record and client builders
//! - [`scenarios`] - the reference portfolios used across test suites
//! - [`solvers`] - scripted [`LinearSolver`](equishare_solver::LinearSolver)
//!   doubles for driving the cascade deterministically
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! equishare-test = { workspace = true }
//! ```

pub mod records;
pub mod scenarios;
pub mod solvers;

pub use records::{client, raw, uniform_clients, uniform_records};
pub use scenarios::{parties, Scenario};
pub use solvers::{FirstOptionSolver, ScriptedSolver};
