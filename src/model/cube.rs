use std::fmt;

use ndarray::{Array2, Array3, Axis, s};

use super::{AxisKind, AxisRange, CubeMetadata, Dim, Mask, MaskedCube, Quantity, Result};

/// Spectral-line cube indexed `(spectral, y, x)`.
#[derive(Debug, Clone)]
pub struct Cube {
    pub data: Array3<f32>,
    pub metadata: CubeMetadata,
}

impl Cube {
    pub fn new(data: Array3<f32>, metadata: CubeMetadata) -> Result<Self> {
        metadata.validate_shape(data.shape())?;
        Ok(Self { data, metadata })
    }

    pub fn from_data_with_default_metadata(data: Array3<f32>) -> Self {
        let metadata = CubeMetadata::from_shape(dims_of(&data));
        Self { data, metadata }
    }

    pub fn shape(&self) -> [usize; 3] {
        dims_of(&self.data)
    }

    pub fn unit(&self) -> Option<&str> {
        self.metadata.unit.as_deref()
    }

    pub fn validate(&self) -> Result<()> {
        self.metadata.validate_shape(self.data.shape())
    }

    /// World coordinates of every channel along the spectral axis.
    pub fn spectral_axis(&self) -> Vec<f64> {
        let [channels, _, _] = self.shape();
        match self.metadata.dim(AxisKind::Spectral) {
            Some(dim) => (0..channels)
                .map(|index| dim.wcs.pixel_to_world(index as f64))
                .collect(),
            None => (0..channels).map(|index| index as f64).collect(),
        }
    }

    pub fn subcube(&self, spectral: &AxisRange, y: &AxisRange, x: &AxisRange) -> Result<Cube> {
        let [channels, height, width] = self.shape();
        let spectral = spectral.resolve(AxisKind::Spectral, channels)?;
        let y = y.resolve(AxisKind::Y, height)?;
        let x = x.resolve(AxisKind::X, width)?;

        let data = self
            .data
            .slice(s![spectral.clone(), y.clone(), x.clone()])
            .to_owned();
        let starts = [spectral.start, y.start, x.start];
        let mut metadata = self.metadata.clone();
        for (dim, (start, size)) in metadata
            .dims
            .iter_mut()
            .zip(starts.into_iter().zip(dims_of(&data)))
        {
            dim.size = size;
            dim.wcs = dim.wcs.shifted(start);
        }
        Cube::new(data, metadata)
    }

    /// NaN-aware sum over the spectral axis.
    pub fn sum_spectral(&self) -> Projection {
        let data = self
            .data
            .map(|value| if value.is_finite() { *value } else { 0.0 })
            .sum_axis(Axis(0));
        let dims = self
            .metadata
            .dims
            .iter()
            .filter(|dim| dim.axis != AxisKind::Spectral)
            .cloned()
            .collect();
        Projection {
            data,
            unit: self.metadata.unit.clone(),
            dims,
        }
    }

    pub fn with_mask<'a>(&'a self, mask: &'a Mask) -> Result<MaskedCube<'a>> {
        MaskedCube::new(self, mask)
    }

    pub fn max(&self) -> Result<Quantity> {
        MaskedCube::new(self, &Mask::All)?.max()
    }

    pub fn std(&self) -> Result<Quantity> {
        MaskedCube::new(self, &Mask::All)?.std()
    }

    pub fn min_max(&self) -> Option<(f32, f32)> {
        finite_min_max(self.data.iter().copied())
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [channels, height, width] = self.shape();
        writeln!(
            formatter,
            "Cube with shape=({channels}, {height}, {width}) and unit={}:",
            self.unit().unwrap_or("")
        )?;
        for axis in [AxisKind::X, AxisKind::Y, AxisKind::Spectral] {
            if let Some(dim) = self.metadata.dim(axis) {
                let unit = dim.wcs.cunit.as_deref().unwrap_or("");
                let label = axis.label();
                writeln!(
                    formatter,
                    "n_{label}: {:>6}  type_{label}: {:<9} unit_{label}: {unit}",
                    dim.size, dim.wcs.ctype
                )?;
            }
        }
        Ok(())
    }
}

/// Two-dimensional `(y, x)` image produced by collapsing a cube.
#[derive(Debug, Clone)]
pub struct Projection {
    pub data: Array2<f32>,
    pub unit: Option<String>,
    pub dims: Vec<Dim>,
}

impl Projection {
    pub fn shape(&self) -> [usize; 2] {
        let (height, width) = self.data.dim();
        [height, width]
    }

    /// Spatial mask including every pixel strictly below `threshold`.
    pub fn below(&self, threshold: f32) -> Mask {
        Mask::spatial(self.data.map(|value| *value < threshold))
    }

    pub fn min_max(&self) -> Option<(f32, f32)> {
        finite_min_max(self.data.iter().copied())
    }
}

pub(crate) fn finite_min_max(values: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    values
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
}

fn dims_of(data: &Array3<f32>) -> [usize; 3] {
    let (channels, height, width) = data.dim();
    [channels, height, width]
}
