use crate::analysis::{
    CubeSummary, NoiseConfig, NoiseEstimate, SubcubeSelection, estimate_noise, select_subcube,
    signal_peak, summarize,
};
use crate::model::{Cube, Quantity};

use super::Result;

#[derive(Debug, Default, Clone, Copy)]
pub struct AnalysisService;

impl AnalysisService {
    pub fn select(&self, cube: &Cube, selection: &SubcubeSelection) -> Result<Cube> {
        Ok(select_subcube(cube, selection)?)
    }

    pub fn noise(&self, cube: &Cube, config: &NoiseConfig) -> Result<NoiseEstimate> {
        Ok(estimate_noise(cube, config)?)
    }

    pub fn peak(&self, cube: &Cube) -> Result<Quantity> {
        Ok(signal_peak(cube)?)
    }

    pub fn summarize(
        &self,
        full: &Cube,
        selected: &Cube,
        config: &NoiseConfig,
    ) -> Result<CubeSummary> {
        Ok(summarize(full, selected, config)?)
    }
}
