use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::analysis::{NoiseConfig, SubcubeSelection};
use crate::model::AxisRange;
use crate::render::{Colormap, Resampling};

#[derive(Debug, Parser)]
#[command(
    name = "cubeviz",
    version,
    about = "Quick-look statistics and volume-rendered movies of spectral-line cubes"
)]
pub(super) struct Cli {
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Prints the shape, unit, and per-axis coordinates of a cube.
    Info {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Writes a subcube to a new FITS file.
    Cut {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Noise level (full cube) and signal peak (selected region).
    Stats {
        input: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        noise: NoiseArgs,
    },
    /// Writes the spectral sum of the cube as PNG or TIFF.
    Quicklook {
        input: PathBuf,
        output: PathBuf,
    },
    /// Plots a transfer function built from explicit bounds.
    Transfer {
        #[arg(long, allow_hyphen_values = true)]
        low: f64,
        #[arg(long, allow_hyphen_values = true)]
        high: f64,
        #[arg(long, default_value_t = 15)]
        layers: usize,
        #[arg(long, default_value_t = Colormap::Hsv)]
        colormap: Colormap,
        #[arg(long)]
        output: PathBuf,
    },
    /// Renders one movie of a cube.
    Render {
        input: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        #[command(flatten)]
        noise: NoiseArgs,
        #[arg(long, default_value_t = 1)]
        spectral_factor: usize,
        #[arg(long, value_parser = parse_resampling, default_value = "nearest")]
        resampling: Resampling,
        #[arg(long, default_value_t = crate::render::DEFAULT_NFRAMES)]
        nframes: usize,
        #[arg(long, default_value_t = crate::render::DEFAULT_SIZE)]
        size: usize,
        #[arg(long, default_value_t = crate::render::DEFAULT_FPS)]
        fps: u32,
        #[arg(long, default_value_t = Colormap::Hot)]
        colormap: Colormap,
        /// Build the transfer function from the noise floor and signal peak
        /// with `--layers` layers instead of the automatic one.
        #[arg(long)]
        custom: bool,
        #[arg(long, default_value_t = 15)]
        layers: usize,
        #[arg(long)]
        no_rescale: bool,
    },
    /// Runs a YAML or JSON recipe.
    Run {
        recipe: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub(super) struct SelectionArgs {
    /// Spectral channel range, e.g. `11:38`.
    #[arg(long)]
    pub(super) spectral: Option<AxisRange>,
    #[arg(long)]
    pub(super) y: Option<AxisRange>,
    #[arg(long)]
    pub(super) x: Option<AxisRange>,
}

impl SelectionArgs {
    pub(super) fn selection(&self) -> SubcubeSelection {
        SubcubeSelection::new(
            self.spectral.unwrap_or_default(),
            self.y.unwrap_or_default(),
            self.x.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Copy, Args)]
pub(super) struct NoiseArgs {
    /// Spectral-sum level below which a pixel counts as signal-free.
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub(super) threshold: f32,
    /// Noise floor in units of the 1-sigma noise.
    #[arg(long, default_value_t = 3.0)]
    pub(super) floor_sigma: f64,
}

impl NoiseArgs {
    pub(super) fn config(&self) -> NoiseConfig {
        NoiseConfig {
            threshold: self.threshold,
            floor_sigma: self.floor_sigma,
        }
    }
}

fn parse_resampling(raw: &str) -> Result<Resampling, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "nearest" => Ok(Resampling::Nearest),
        "linear" => Ok(Resampling::Linear),
        other => Err(format!("unknown resampling `{other}`; expected nearest or linear")),
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AxisInfo {
    pub(super) axis: String,
    pub(super) size: usize,
    pub(super) ctype: String,
    pub(super) cunit: Option<String>,
    pub(super) crval: f64,
    pub(super) crpix: f64,
    pub(super) cdelt: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct CubeInfo {
    pub(super) shape: [usize; 3],
    pub(super) unit: Option<String>,
    pub(super) pixel_type: String,
    pub(super) axes: Vec<AxisInfo>,
    pub(super) source: Option<String>,
    pub(super) min: Option<f32>,
    pub(super) max: Option<f32>,
}
