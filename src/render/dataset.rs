use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::model::{AxisKind, Cube, CubeMetadata, finite_min_max};

use super::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    #[default]
    Nearest,
    Linear,
}

/// Cube prepared for volume rendering, with the spectral axis resampled to
/// `spectral_factor` times its original length.
#[derive(Debug, Clone)]
pub struct RenderableDataset {
    data: Array3<f32>,
    metadata: CubeMetadata,
    spectral_factor: usize,
    resampling: Resampling,
}

impl RenderableDataset {
    pub fn from_cube(cube: &Cube, spectral_factor: usize, resampling: Resampling) -> Result<Self> {
        if spectral_factor == 0 {
            return Err(RenderError::Configuration(
                "spectral factor must be at least 1".to_string(),
            ));
        }
        cube.validate()?;
        let data = if spectral_factor == 1 {
            cube.data.clone()
        } else {
            stretch_spectral(&cube.data, spectral_factor, resampling)
        };
        let mut metadata = cube.metadata.clone();
        if let Some(index) = metadata.axis_index(AxisKind::Spectral) {
            let dim = &mut metadata.dims[index];
            dim.size *= spectral_factor;
            dim.wcs = dim.wcs.stretched(spectral_factor);
        }
        metadata.validate_shape(data.shape())?;
        log::debug!(
            "renderable dataset {:?} (spectral factor {spectral_factor}, {resampling:?})",
            data.dim()
        );
        Ok(Self {
            data,
            metadata,
            spectral_factor,
            resampling,
        })
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn metadata(&self) -> &CubeMetadata {
        &self.metadata
    }

    /// `(spectral, y, x)` lengths after resampling.
    pub fn shape(&self) -> [usize; 3] {
        let (channels, height, width) = self.data.dim();
        [channels, height, width]
    }

    pub fn spectral_factor(&self) -> usize {
        self.spectral_factor
    }

    pub fn resampling(&self) -> Resampling {
        self.resampling
    }

    pub fn finite_range(&self) -> Option<(f32, f32)> {
        finite_min_max(self.data.iter().copied())
    }
}

fn stretch_spectral(data: &Array3<f32>, factor: usize, resampling: Resampling) -> Array3<f32> {
    let (channels, height, width) = data.dim();
    let mut stretched = Array3::<f32>::zeros((channels * factor, height, width));
    Zip::indexed(&mut stretched).par_for_each(|(channel, y, x), value| {
        *value = match resampling {
            Resampling::Nearest => data[[channel / factor, y, x]],
            Resampling::Linear => {
                let source = ((channel as f64 + 0.5) / factor as f64 - 0.5)
                    .clamp(0.0, (channels - 1) as f64);
                let lower = source.floor() as usize;
                let upper = (lower + 1).min(channels - 1);
                let weight = (source - lower as f64) as f32;
                if weight <= 0.0 {
                    data[[lower, y, x]]
                } else {
                    data[[lower, y, x]] * (1.0 - weight) + data[[upper, y, x]] * weight
                }
            }
        };
    });
    stretched
}
