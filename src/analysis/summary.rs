use serde::{Deserialize, Serialize};

use crate::model::{Cube, Quantity};

use super::{NoiseConfig, NoiseEstimate, Result, estimate_noise};

/// Parameters needed to pick a visualization range, cheap to compute
/// before committing to a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSummary {
    pub noise: NoiseEstimate,
    pub floor: Quantity,
    pub peak: Quantity,
}

impl CubeSummary {
    pub fn display_range(&self) -> (f64, f64) {
        (self.floor.value, self.peak.value)
    }
}

pub fn signal_peak(cube: &Cube) -> Result<Quantity> {
    Ok(cube.max()?)
}

/// Noise is measured on the full cube, the peak on the selected region.
pub fn summarize(full: &Cube, selected: &Cube, config: &NoiseConfig) -> Result<CubeSummary> {
    let noise = estimate_noise(full, config)?;
    let peak = signal_peak(selected)?;
    let floor = noise.floor(config.floor_sigma);
    Ok(CubeSummary { noise, floor, peak })
}
