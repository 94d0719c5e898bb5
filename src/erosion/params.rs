//! Erosion pass parameters

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Erosion diffusion parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Cells within this distance of each other exchange erosion (map units)
    pub radius: f64,

    /// Fraction of the height difference a lower neighbor accumulates
    /// as erosion (0.0-1.0)
    pub rate: f64,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            radius: 150.0,
            rate: 0.1,
        }
    }
}

impl ErosionParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) {
            return Err(MapError::invalid(format!(
                "erosion radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.rate >= 0.0 && self.rate <= 1.0) {
            return Err(MapError::invalid(format!(
                "erosion rate must be within [0, 1], got {}",
                self.rate
            )));
        }
        Ok(())
    }
}
