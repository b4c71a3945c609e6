use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::CubeSummary;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub step: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieReport {
    pub name: String,
    pub frames: Vec<PathBuf>,
    pub rendered: usize,
    pub reused: usize,
    pub video: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowReport {
    pub recipe_name: Option<String>,
    pub input: PathBuf,
    pub input_shape: [usize; 3],
    pub selected_shape: [usize; 3],
    pub renderable_shape: [usize; 3],
    pub summary: CubeSummary,
    pub transfer_bounds: Option<(f64, f64)>,
    pub quicklook: Option<PathBuf>,
    pub transfer_preview: Option<PathBuf>,
    pub movies: Vec<MovieReport>,
    pub steps: Vec<StepReport>,
}
