use std::fmt;
use std::str::FromStr;

use palette::{Hsv, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use super::RenderError;

const VIRIDIS: [[f32; 3]; 9] = [
    [0.267, 0.005, 0.329],
    [0.283, 0.141, 0.458],
    [0.254, 0.265, 0.530],
    [0.207, 0.372, 0.553],
    [0.164, 0.471, 0.558],
    [0.128, 0.567, 0.551],
    [0.135, 0.659, 0.518],
    [0.478, 0.821, 0.318],
    [0.993, 0.906, 0.144],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Gray,
    #[default]
    Hot,
    Hsv,
    Viridis,
}

impl Colormap {
    pub fn names() -> &'static [&'static str] {
        &["gray", "hot", "hsv", "viridis"]
    }

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Gray => "gray",
            Colormap::Hot => "hot",
            Colormap::Hsv => "hsv",
            Colormap::Viridis => "viridis",
        }
    }

    /// RGB in `[0, 1]` for a position `t` in `[0, 1]` (clamped).
    pub fn sample(self, t: f32) -> [f32; 3] {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Colormap::Gray => [t, t, t],
            Colormap::Hot => [
                (3.0 * t).clamp(0.0, 1.0),
                (3.0 * t - 1.0).clamp(0.0, 1.0),
                (3.0 * t - 2.0).clamp(0.0, 1.0),
            ],
            Colormap::Hsv => {
                let hsv: Hsv = Hsv::new(t * 360.0, 1.0, 1.0);
                let rgb: Srgb = hsv.into_color();
                [rgb.red, rgb.green, rgb.blue]
            }
            Colormap::Viridis => interpolate(&VIRIDIS, t),
        }
    }
}

fn interpolate(stops: &[[f32; 3]], t: f32) -> [f32; 3] {
    let position = t * (stops.len() - 1) as f32;
    let lower = (position.floor() as usize).min(stops.len() - 1);
    let upper = (lower + 1).min(stops.len() - 1);
    let weight = position - lower as f32;
    let mut rgb = [0.0; 3];
    for (channel, value) in rgb.iter_mut().enumerate() {
        *value = stops[lower][channel] * (1.0 - weight) + stops[upper][channel] * weight;
    }
    rgb
}

impl FromStr for Colormap {
    type Err = RenderError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" => Ok(Colormap::Gray),
            "hot" => Ok(Colormap::Hot),
            "hsv" => Ok(Colormap::Hsv),
            "viridis" => Ok(Colormap::Viridis),
            other => Err(RenderError::Configuration(format!(
                "unknown colormap `{other}`; expected one of {}",
                Colormap::names().join(", ")
            ))),
        }
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}
