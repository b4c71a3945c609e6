use ndarray::{Array2, Array3};

use super::{CoreError, Cube, Quantity, Result};

/// Boolean selection of voxels. A spatial mask is broadcast across every
/// spectral channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Mask {
    All,
    Spatial(Array2<bool>),
    Voxel(Array3<bool>),
}

impl Mask {
    pub fn spatial(include: Array2<bool>) -> Self {
        Mask::Spatial(include)
    }

    pub fn voxel(include: Array3<bool>) -> Self {
        Mask::Voxel(include)
    }

    pub fn check_shape(&self, shape: [usize; 3]) -> Result<()> {
        let found = match self {
            Mask::All => return Ok(()),
            Mask::Spatial(include) => include.shape().to_vec(),
            Mask::Voxel(include) => include.shape().to_vec(),
        };
        let compatible = match self {
            Mask::Spatial(_) => found == shape[1..],
            _ => found == shape,
        };
        if compatible {
            Ok(())
        } else {
            Err(CoreError::MaskShapeMismatch {
                expected: shape.to_vec(),
                found,
            })
        }
    }

    pub fn includes(&self, channel: usize, y: usize, x: usize) -> bool {
        match self {
            Mask::All => true,
            Mask::Spatial(include) => include[[y, x]],
            Mask::Voxel(include) => include[[channel, y, x]],
        }
    }

    /// Number of spatial pixels (or voxels) the mask selects; `None` for `All`.
    pub fn selected(&self) -> Option<usize> {
        match self {
            Mask::All => None,
            Mask::Spatial(include) => Some(include.iter().filter(|value| **value).count()),
            Mask::Voxel(include) => Some(include.iter().filter(|value| **value).count()),
        }
    }
}

/// A cube viewed through a mask. Reductions only see included, finite voxels.
#[derive(Debug, Clone, Copy)]
pub struct MaskedCube<'a> {
    cube: &'a Cube,
    mask: &'a Mask,
}

impl<'a> MaskedCube<'a> {
    pub fn new(cube: &'a Cube, mask: &'a Mask) -> Result<Self> {
        mask.check_shape(cube.shape())?;
        Ok(Self { cube, mask })
    }

    pub fn cube(&self) -> &'a Cube {
        self.cube
    }

    pub fn mask(&self) -> &'a Mask {
        self.mask
    }

    pub fn values(&self) -> impl Iterator<Item = f32> + 'a {
        let mask = self.mask;
        let cube = self.cube;
        cube.data
            .indexed_iter()
            .filter(move |((channel, y, x), _)| mask.includes(*channel, *y, *x))
            .map(|(_, value)| *value)
            .filter(|value| value.is_finite())
    }

    pub fn count(&self) -> usize {
        self.values().count()
    }

    pub fn sum(&self) -> Result<Quantity> {
        let (count, sum) = self
            .values()
            .fold((0usize, 0.0_f64), |(count, sum), value| {
                (count + 1, sum + f64::from(value))
            });
        if count == 0 {
            return Err(CoreError::EmptySelection { statistic: "sum" });
        }
        Ok(self.quantity(sum))
    }

    pub fn mean(&self) -> Result<Quantity> {
        let (count, mean) = self.count_and_mean();
        if count == 0 {
            return Err(CoreError::EmptySelection { statistic: "mean" });
        }
        Ok(self.quantity(mean))
    }

    /// Population standard deviation (`ddof = 0`).
    pub fn std(&self) -> Result<Quantity> {
        let (count, mean) = self.count_and_mean();
        if count == 0 {
            return Err(CoreError::EmptySelection { statistic: "std" });
        }
        let variance = self
            .values()
            .map(|value| {
                let delta = f64::from(value) - mean;
                delta * delta
            })
            .sum::<f64>()
            / count as f64;
        Ok(self.quantity(variance.sqrt()))
    }

    pub fn max(&self) -> Result<Quantity> {
        self.values()
            .reduce(f32::max)
            .map(|value| self.quantity(f64::from(value)))
            .ok_or(CoreError::EmptySelection { statistic: "max" })
    }

    pub fn min(&self) -> Result<Quantity> {
        self.values()
            .reduce(f32::min)
            .map(|value| self.quantity(f64::from(value)))
            .ok_or(CoreError::EmptySelection { statistic: "min" })
    }

    fn count_and_mean(&self) -> (usize, f64) {
        let (count, sum) = self
            .values()
            .fold((0usize, 0.0_f64), |(count, sum), value| {
                (count + 1, sum + f64::from(value))
            });
        (count, sum / count.max(1) as f64)
    }

    fn quantity(&self, value: f64) -> Quantity {
        Quantity::new(value, self.cube.metadata.unit.clone())
    }
}
