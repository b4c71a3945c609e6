use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::formats::write_rgb_image;

use super::{Colormap, RenderError, Result};

pub const DEFAULT_BINS: usize = 256;
pub const AUTO_LAYERS: usize = 10;

/// Maps scalar intensity in `[low, high]` to emission colour and opacity.
/// Values outside the bounds are fully transparent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    low: f64,
    high: f64,
    red: Vec<f32>,
    green: Vec<f32>,
    blue: Vec<f32>,
    alpha: Vec<f32>,
}

impl TransferFunction {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        Self::with_bins(low, high, DEFAULT_BINS)
    }

    pub fn with_bins(low: f64, high: f64, bins: usize) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(RenderError::Configuration(format!(
                "transfer function bounds must be finite, got ({low}, {high})"
            )));
        }
        if low >= high {
            return Err(RenderError::Configuration(format!(
                "transfer function needs low < high, got ({low}, {high})"
            )));
        }
        if bins < 2 {
            return Err(RenderError::Configuration(
                "transfer function needs at least 2 bins".to_string(),
            ));
        }
        Ok(Self {
            low,
            high,
            red: vec![0.0; bins],
            green: vec![0.0; bins],
            blue: vec![0.0; bins],
            alpha: vec![0.0; bins],
        })
    }

    /// Default mapping used when a render is not given an explicit one.
    pub fn auto(low: f64, high: f64, colormap: Colormap) -> Result<Self> {
        let mut transfer = Self::new(low, high)?;
        transfer.add_layers(AUTO_LAYERS, colormap)?;
        Ok(transfer)
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    pub fn bins(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.iter().all(|alpha| *alpha <= 0.0)
    }

    fn bin_value(&self, bin: usize) -> f64 {
        self.low + (self.high - self.low) * bin as f64 / (self.bins() - 1) as f64
    }

    /// Adds `height * exp(-(x - location)^2 / width)` to each channel,
    /// keeping the larger of the existing and new value per bin.
    pub fn add_gaussian(&mut self, location: f64, width: f64, rgba: [f32; 4]) -> Result<()> {
        if !(width.is_finite() && width > 0.0) || !location.is_finite() {
            return Err(RenderError::Configuration(format!(
                "gaussian layer needs a finite location and width > 0, got ({location}, {width})"
            )));
        }
        for bin in 0..self.bins() {
            let offset = self.bin_value(bin) - location;
            let weight = (-(offset * offset) / width).exp() as f32;
            let channels = [
                &mut self.red[bin],
                &mut self.green[bin],
                &mut self.blue[bin],
                &mut self.alpha[bin],
            ];
            for (channel, height) in channels.into_iter().zip(rgba) {
                *channel = channel.max(height * weight);
            }
        }
        Ok(())
    }

    /// Adds `count` evenly spaced gaussian layers coloured from `colormap`,
    /// opacity rising logarithmically from 1e-3 at the low end to 1.
    pub fn add_layers(&mut self, count: usize, colormap: Colormap) -> Result<()> {
        if count == 0 {
            return Err(RenderError::Configuration(
                "layer count must be at least 1".to_string(),
            ));
        }
        let range = self.high - self.low;
        let spacing = range / count as f64;
        let width = spacing * spacing / 20.0;
        for layer in 0..count {
            let fraction = (layer as f64 + 0.5) / count as f64;
            let location = self.low + fraction * range;
            let alpha = if count == 1 {
                1.0
            } else {
                10f32.powf(-3.0 + 3.0 * layer as f32 / (count - 1) as f32)
            };
            let [red, green, blue] = colormap.sample(fraction as f32);
            self.add_gaussian(location, width, [red, green, blue, alpha])?;
        }
        Ok(())
    }

    /// Linearly interpolated RGBA for `value`.
    pub fn sample(&self, value: f32) -> [f32; 4] {
        let value = f64::from(value);
        if !value.is_finite() || value < self.low || value > self.high {
            return [0.0; 4];
        }
        let position = (value - self.low) / (self.high - self.low) * (self.bins() - 1) as f64;
        let lower = (position.floor() as usize).min(self.bins() - 1);
        let upper = (lower + 1).min(self.bins() - 1);
        let weight = (position - lower as f64) as f32;
        let lerp = |channel: &[f32]| channel[lower] * (1.0 - weight) + channel[upper] * weight;
        [
            lerp(&self.red),
            lerp(&self.green),
            lerp(&self.blue),
            lerp(&self.alpha),
        ]
    }

    /// Draws opacity against intensity, filled with the emission colour,
    /// on a white background. Opacity is normalised to the tallest layer.
    pub fn plot(&self, path: impl AsRef<Path>, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::Configuration(
                "plot size must be positive".to_string(),
            ));
        }
        let peak = self.alpha.iter().copied().fold(0.0_f32, f32::max);
        let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };
        let mut pixels = vec![255u8; width * height * 3];
        for column in 0..width {
            let value = self.low + (self.high - self.low) * (column as f64 + 0.5) / width as f64;
            let [red, green, blue, alpha] = self.sample(value as f32);
            let filled = ((alpha * scale).clamp(0.0, 1.0) * (height - 1) as f32).round() as usize;
            for level in 0..=filled {
                let row = height - 1 - level;
                let color = if level == filled {
                    [0, 0, 0]
                } else {
                    [to_byte(red), to_byte(green), to_byte(blue)]
                };
                let offset = (row * width + column) * 3;
                pixels[offset..offset + 3].copy_from_slice(&color);
            }
        }
        let path = path.as_ref();
        write_rgb_image(path, width, height, pixels).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
