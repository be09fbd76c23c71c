//! Relaxation levels of the assignment cascade.

use crate::error::{EquiShareError, Result};

/// One tolerance/zone configuration tried by the cascade.
///
/// Levels are tried strictly in order; the first one whose constraint
/// model is satisfiable produces the assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelaxationLevel {
    /// Relative tolerance around the ideal even split, in (0, 1].
    pub tolerance: f64,
    /// Whether per-zone account balance is enforced.
    pub use_zone_balancing: bool,
    /// Method label reported when this level wins.
    pub label: String,
}

impl RelaxationLevel {
    pub fn new(tolerance: f64, use_zone_balancing: bool, label: impl Into<String>) -> Self {
        Self {
            tolerance,
            use_zone_balancing,
            label: label.into(),
        }
    }

    /// Checks that the tolerance lies in (0, 1].
    pub fn validate(&self) -> Result<()> {
        if self.tolerance > 0.0 && self.tolerance <= 1.0 {
            Ok(())
        } else {
            Err(EquiShareError::InvalidTolerance {
                label: self.label.clone(),
                tolerance: self.tolerance,
            })
        }
    }

    /// The standard four-level ladder, strictest first.
    ///
    /// Zone balance is given up before the numeric tolerance is widened.
    ///
    /// ```
    /// use equishare_core::RelaxationLevel;
    ///
    /// let ladder = RelaxationLevel::standard_ladder();
    /// assert_eq!(ladder.len(), 4);
    /// assert!(ladder[0].use_zone_balancing);
    /// assert_eq!(ladder[3].tolerance, 0.15);
    /// ```
    pub fn standard_ladder() -> Vec<RelaxationLevel> {
        vec![
            RelaxationLevel::new(0.02, true, "Strict (2%)"),
            RelaxationLevel::new(0.05, true, "Medium (5%)"),
            RelaxationLevel::new(0.05, false, "Flexible (5%, no zones)"),
            RelaxationLevel::new(0.15, false, "Rescue (15%, no zones)"),
        ]
    }
}
