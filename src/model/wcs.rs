use serde::{Deserialize, Serialize};

/// `CTYPE` prefixes that mark a spectral axis.
pub const SPECTRAL_CTYPES: &[&str] = &[
    "FREQ", "ENER", "WAVN", "VRAD", "WAVE", "VOPT", "ZOPT", "AWAV", "VELO", "BETA", "FELO",
];

/// Linear world coordinate description of a single axis, using the FITS
/// convention of a 1-based reference pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisWcs {
    pub ctype: String,
    pub cunit: Option<String>,
    pub crval: f64,
    pub crpix: f64,
    pub cdelt: f64,
}

impl Default for AxisWcs {
    fn default() -> Self {
        Self {
            ctype: String::new(),
            cunit: None,
            crval: 0.0,
            crpix: 0.0,
            cdelt: 1.0,
        }
    }
}

impl AxisWcs {
    pub fn linear(ctype: impl Into<String>, crval: f64, crpix: f64, cdelt: f64) -> Self {
        Self {
            ctype: ctype.into(),
            cunit: None,
            crval,
            crpix,
            cdelt,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.cunit = Some(unit.into());
        self
    }

    /// World coordinate of a zero-based array index.
    pub fn pixel_to_world(&self, index: f64) -> f64 {
        self.crval + (index + 1.0 - self.crpix) * self.cdelt
    }

    pub fn world_to_pixel(&self, world: f64) -> f64 {
        (world - self.crval) / self.cdelt + self.crpix - 1.0
    }

    pub fn is_spectral(&self) -> bool {
        let ctype = self.ctype.trim().to_ascii_uppercase();
        SPECTRAL_CTYPES
            .iter()
            .any(|prefix| ctype.starts_with(prefix))
    }

    /// Coordinates after dropping the first `start` pixels of the axis.
    pub fn shifted(&self, start: usize) -> Self {
        Self {
            crpix: self.crpix - start as f64,
            ..self.clone()
        }
    }

    /// Coordinates after resampling the axis to `factor` times as many
    /// pixels covering the same world extent.
    pub fn stretched(&self, factor: usize) -> Self {
        let factor = factor as f64;
        Self {
            crpix: factor * (self.crpix - 0.5) + 0.5,
            cdelt: self.cdelt / factor,
            ..self.clone()
        }
    }
}
