use serde::{Deserialize, Serialize};

use crate::model::{AxisRange, Cube};

use super::Result;

/// One index range per cube axis; omitted axes keep their full extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubcubeSelection {
    #[serde(default)]
    pub spectral: AxisRange,
    #[serde(default)]
    pub y: AxisRange,
    #[serde(default)]
    pub x: AxisRange,
}

impl SubcubeSelection {
    pub fn new(spectral: AxisRange, y: AxisRange, x: AxisRange) -> Self {
        Self { spectral, y, x }
    }

    pub fn is_full(&self) -> bool {
        *self == Self::default()
    }
}

pub fn select_subcube(cube: &Cube, selection: &SubcubeSelection) -> Result<Cube> {
    if selection.is_full() {
        return Ok(cube.clone());
    }
    let subcube = cube.subcube(&selection.spectral, &selection.y, &selection.x)?;
    log::debug!(
        "selected subcube [{}, {}, {}] -> shape {:?}",
        selection.spectral,
        selection.y,
        selection.x,
        subcube.shape()
    );
    Ok(subcube)
}
