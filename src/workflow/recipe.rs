use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{NoiseConfig, SubcubeSelection};
use crate::render::{
    CameraPath, Colormap, DEFAULT_FPS, DEFAULT_NFRAMES, DEFAULT_SIZE, MovieConfig, Resampling,
    TransferFunction,
};

use super::{PipelineError, Result};

pub const DEFAULT_LAYERS: usize = 15;

/// A complete quick-look run over one cube.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub name: Option<String>,
    pub input: PathBuf,
    /// Directory that movie folders, previews, and quick-looks are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub subcube: SubcubeSelection,
    #[serde(default)]
    pub noise: NoiseConfig,
    /// Spectral-sum projection image of the full cube.
    #[serde(default)]
    pub quicklook: Option<PathBuf>,
    #[serde(default)]
    pub render: RenderRecipe,
    #[serde(default)]
    pub transfer_function: TransferRecipe,
    #[serde(default)]
    pub movies: Vec<MovieRecipe>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderRecipe {
    pub spectral_factor: usize,
    pub resampling: Resampling,
}

impl Default for RenderRecipe {
    fn default() -> Self {
        Self {
            spectral_factor: 1,
            resampling: Resampling::default(),
        }
    }
}

/// Custom transfer function. Bounds default to the noise floor and the
/// signal peak of the selected region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransferRecipe {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub layers: usize,
    pub colormap: Colormap,
    pub preview: Option<PathBuf>,
}

impl Default for TransferRecipe {
    fn default() -> Self {
        Self {
            low: None,
            high: None,
            layers: DEFAULT_LAYERS,
            colormap: Colormap::Hsv,
            preview: None,
        }
    }
}

impl TransferRecipe {
    pub fn build(&self, default_low: f64, default_high: f64) -> Result<TransferFunction> {
        let low = self.low.unwrap_or(default_low);
        let high = self.high.unwrap_or(default_high);
        let mut transfer = TransferFunction::new(low, high)?;
        transfer.add_layers(self.layers, self.colormap)?;
        Ok(transfer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecipe {
    /// Output folder under the recipe's `output_dir`.
    pub name: String,
    /// Use the recipe's custom transfer function instead of the automatic one.
    #[serde(default)]
    pub custom_transfer_function: bool,
    #[serde(default = "default_nframes")]
    pub nframes: usize,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub colormap: Colormap,
    #[serde(default)]
    pub camera: CameraPath,
    #[serde(default = "default_rescale")]
    pub rescale: bool,
}

impl MovieRecipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            custom_transfer_function: false,
            nframes: DEFAULT_NFRAMES,
            size: DEFAULT_SIZE,
            fps: DEFAULT_FPS,
            colormap: Colormap::default(),
            camera: CameraPath::default(),
            rescale: true,
        }
    }

    pub fn config(&self, transfer_function: Option<TransferFunction>) -> MovieConfig {
        MovieConfig {
            transfer_function,
            colormap: self.colormap,
            nframes: self.nframes,
            size: self.size,
            fps: self.fps,
            camera: self.camera,
            rescale: self.rescale,
            ..MovieConfig::default()
        }
    }
}

/// A movie directory must stay a single component below `output_dir`.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_nframes() -> usize {
    DEFAULT_NFRAMES
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_rescale() -> bool {
    true
}

impl Recipe {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            input: input.into(),
            output_dir: default_output_dir(),
            subcube: SubcubeSelection::default(),
            noise: NoiseConfig::default(),
            quicklook: None,
            render: RenderRecipe::default(),
            transfer_function: TransferRecipe::default(),
            movies: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(PipelineError::Parse("recipe `input` must not be empty".to_string()));
        }
        if self.render.spectral_factor == 0 {
            return Err(PipelineError::Parse(
                "`render.spectral_factor` must be at least 1".to_string(),
            ));
        }
        if self.transfer_function.layers == 0 {
            return Err(PipelineError::Parse(
                "`transfer_function.layers` must be at least 1".to_string(),
            ));
        }
        self.noise
            .validate()
            .map_err(|err| PipelineError::Parse(err.to_string()))?;
        for (index, movie) in self.movies.iter().enumerate() {
            let name = movie.name.trim();
            if name.is_empty() {
                return Err(PipelineError::Parse(format!(
                    "movie at index {index} has an empty name"
                )));
            }
            if !is_plain_name(&movie.name) {
                return Err(PipelineError::Parse(format!(
                    "movie name `{name}` must be a plain directory name inside `output_dir`"
                )));
            }
            if self.movies[..index].iter().any(|other| other.name == movie.name) {
                return Err(PipelineError::Parse(format!(
                    "movie name `{name}` is used more than once"
                )));
            }
            movie
                .config(None)
                .validate()
                .map_err(|err| PipelineError::Parse(format!("movie `{name}`: {err}")))?;
        }
        Ok(())
    }

    pub fn needs_custom_transfer(&self) -> bool {
        self.transfer_function.preview.is_some()
            || self.movies.iter().any(|movie| movie.custom_transfer_function)
    }

    /// Makes every relative path relative to `base` instead of the working
    /// directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.input);
        resolve(&mut self.output_dir);
        if let Some(path) = self.quicklook.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.transfer_function.preview.as_mut() {
            resolve(path);
        }
    }
}
