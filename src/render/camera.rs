use std::f64::consts::TAU;

use nalgebra::{Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use super::{RenderError, Result};

/// Orbit followed by the camera over a movie. Vectors are given in
/// `(x, y, spectral)` volume coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPath {
    pub view: [f64; 3],
    pub north: [f64; 3],
    pub turns: f64,
}

impl Default for CameraPath {
    fn default() -> Self {
        Self {
            view: [0.0, 1.0, 0.0],
            north: [0.0, 0.0, 1.0],
            turns: 1.0,
        }
    }
}

impl CameraPath {
    pub fn validate(&self) -> Result<()> {
        let view = Vector3::from(self.view);
        let north = Vector3::from(self.north);
        if !self.turns.is_finite() {
            return Err(RenderError::Configuration("camera turns must be finite".into()));
        }
        if view.norm() <= f64::EPSILON || north.norm() <= f64::EPSILON {
            return Err(RenderError::Configuration(
                "camera view and north vectors must be non-zero".into(),
            ));
        }
        if view.normalize().cross(&north.normalize()).norm() < 1e-6 {
            return Err(RenderError::Configuration(
                "camera view vector must not be parallel to the north vector".into(),
            ));
        }
        Ok(())
    }

    /// Camera for frame `index` of `frames`, rotated about `north`.
    pub fn camera(&self, index: usize, frames: usize) -> Result<Camera> {
        self.validate()?;
        let north = Unit::new_normalize(Vector3::from(self.north));
        let angle = TAU * self.turns * index as f64 / frames.max(1) as f64;
        let rotation = Rotation3::from_axis_angle(&north, angle);
        let direction = (rotation * Vector3::from(self.view)).normalize();
        let north = north.into_inner();
        let up = (north - direction * direction.dot(&north)).normalize();
        let right = direction.cross(&up);
        Ok(Camera {
            direction,
            up,
            right,
        })
    }
}

/// Orthographic camera looking along `direction` at the volume centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub direction: Vector3<f64>,
    pub up: Vector3<f64>,
    pub right: Vector3<f64>,
}
