use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AxisKind, AxisWcs, CUBE_AXES, CoreError, PixelType, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dim {
    pub axis: AxisKind,
    pub size: usize,
    pub wcs: AxisWcs,
}

impl Dim {
    pub fn new(axis: AxisKind, size: usize) -> Self {
        let ctype = match axis {
            AxisKind::Spectral => "FREQ",
            AxisKind::Y => "LINEAR",
            AxisKind::X => "LINEAR",
        };
        Self {
            axis,
            size,
            wcs: AxisWcs::linear(ctype, 0.0, 1.0, 1.0),
        }
    }

    pub fn with_wcs(mut self, wcs: AxisWcs) -> Self {
        self.wcs = wcs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeMetadata {
    pub dims: Vec<Dim>,
    pub unit: Option<String>,
    pub pixel_type: PixelType,
    pub source: Option<PathBuf>,
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for CubeMetadata {
    fn default() -> Self {
        Self {
            dims: Vec::new(),
            unit: None,
            pixel_type: PixelType::F32,
            source: None,
            extras: BTreeMap::new(),
        }
    }
}

impl CubeMetadata {
    pub fn from_shape(shape: [usize; 3]) -> Self {
        let dims = CUBE_AXES
            .iter()
            .zip(shape)
            .map(|(axis, size)| Dim::new(*axis, size))
            .collect();
        Self {
            dims,
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dims.iter().map(|d| d.size).collect()
    }

    pub fn axis_index(&self, axis: AxisKind) -> Option<usize> {
        self.dims.iter().position(|d| d.axis == axis)
    }

    pub fn dim(&self, axis: AxisKind) -> Option<&Dim> {
        self.dims.iter().find(|d| d.axis == axis)
    }

    pub fn validate_shape(&self, shape: &[usize]) -> Result<()> {
        if self.dims.len() != shape.len() {
            return Err(CoreError::DimensionalityMismatch {
                data_ndim: shape.len(),
                meta_ndim: self.dims.len(),
            });
        }
        for (axis, (dim, actual)) in self.dims.iter().zip(shape).enumerate() {
            if dim.size == 0 {
                return Err(CoreError::ZeroSizedDimension { axis });
            }
            if dim.size != *actual {
                return Err(CoreError::DimensionSizeMismatch {
                    axis,
                    data_size: *actual,
                    meta_size: dim.size,
                });
            }
        }
        if shape.len() == CUBE_AXES.len() {
            for (dim, expected) in self.dims.iter().zip(CUBE_AXES) {
                if dim.axis != expected {
                    return Err(CoreError::InvalidMetadata(format!(
                        "cube axes must be ordered (spectral, y, x), found {:?}",
                        self.dims.iter().map(|d| d.axis).collect::<Vec<_>>()
                    )));
                }
            }
        }
        Ok(())
    }
}
