//! Error types for EquiShare

use thiserror::Error;

/// Main error type for EquiShare operations
#[derive(Debug, Error)]
pub enum EquiShareError {
    /// Required input (file, sheet, table) is absent
    #[error("Input missing: {0}")]
    InputMissing(String),

    /// A party set must contain at least one party
    #[error("Party set is empty")]
    EmptyPartySet,

    /// A party identifier occurs more than once in a party set
    #[error("Duplicate party: {0}")]
    DuplicateParty(String),

    /// A party index does not address a member of the party set
    #[error("Party index {index} out of range for {count} parties")]
    PartyOutOfRange { index: usize, count: usize },

    /// A client was assigned twice within one assignment
    #[error("Client {0} is already assigned")]
    AlreadyAssigned(String),

    /// A relaxation level tolerance is outside (0, 1]
    #[error("Relaxation level '{label}' has tolerance {tolerance} outside (0, 1]")]
    InvalidTolerance { label: String, tolerance: f64 },

    /// Error while building the constraint model for a batch
    #[error("Model error: {0}")]
    Model(String),

    /// Error in engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for EquiShare operations
pub type Result<T> = std::result::Result<T, EquiShareError>;
