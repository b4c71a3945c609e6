mod error;
mod noise;
mod select;
mod summary;

#[cfg(test)]
mod tests;

pub use error::{AnalysisError, Result};
pub use noise::{NoiseConfig, NoiseEstimate, estimate_noise};
pub use select::{SubcubeSelection, select_subcube};
pub use summary::{CubeSummary, signal_peak, summarize};
