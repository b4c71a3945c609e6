use serde::{Deserialize, Serialize};

use crate::model::{Cube, Quantity};

use super::{AnalysisError, Result};

pub const DEFAULT_NOISE_THRESHOLD: f32 = 1.0;
pub const DEFAULT_FLOOR_SIGMA: f64 = 3.0;

/// `threshold` is compared against the spectral sum of each spatial pixel,
/// in the cube's own units; it is chosen per dataset by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub threshold: f32,
    pub floor_sigma: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_NOISE_THRESHOLD,
            floor_sigma: DEFAULT_FLOOR_SIGMA,
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(AnalysisError::InvalidParams(
                "noise `threshold` must be finite".to_string(),
            ));
        }
        if !self.floor_sigma.is_finite() || self.floor_sigma < 0.0 {
            return Err(AnalysisError::InvalidParams(
                "`floor_sigma` must be a finite value >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseEstimate {
    pub sigma: Quantity,
    pub threshold: f32,
    pub signal_free_pixels: usize,
    pub included_voxels: usize,
}

impl NoiseEstimate {
    pub fn floor(&self, floor_sigma: f64) -> Quantity {
        self.sigma.scaled(floor_sigma)
    }
}

pub fn estimate_noise(cube: &Cube, config: &NoiseConfig) -> Result<NoiseEstimate> {
    config.validate()?;
    let projection = cube.sum_spectral();
    let mask = projection.below(config.threshold);
    let masked = cube.with_mask(&mask)?;
    let sigma = masked.std()?;
    let estimate = NoiseEstimate {
        sigma,
        threshold: config.threshold,
        signal_free_pixels: mask.selected().unwrap_or(0),
        included_voxels: masked.count(),
    };
    log::debug!(
        "noise from {} signal-free pixels ({} voxels) below {}: {}",
        estimate.signal_free_pixels,
        estimate.included_voxels,
        config.threshold,
        estimate.sigma
    );
    Ok(estimate)
}
