use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::formats::{IoError, write_rgb_image};

use super::{
    CameraPath, CancelToken, Colormap, EncodeRequest, RenderError, RenderableDataset, Result,
    TransferFunction, VideoEncoder, render_frame,
};

pub const DEFAULT_NFRAMES: usize = 30;
pub const DEFAULT_SIZE: usize = 256;
pub const DEFAULT_FPS: u32 = 10;

const PARTIAL_SUFFIX: &str = ".partial.png";
const FINGERPRINT_SUFFIX: &str = "job.json";

/// Called with `(completed, total)` after each newly rendered frame.
pub type FrameObserver = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieConfig {
    /// Explicit mapping; when absent one is derived from the data range.
    pub transfer_function: Option<TransferFunction>,
    pub colormap: Colormap,
    pub nframes: usize,
    pub size: usize,
    pub fps: u32,
    pub camera: CameraPath,
    pub rescale: bool,
    pub image_prefix: String,
    pub output_filename: String,
}

impl Default for MovieConfig {
    fn default() -> Self {
        Self {
            transfer_function: None,
            colormap: Colormap::default(),
            nframes: DEFAULT_NFRAMES,
            size: DEFAULT_SIZE,
            fps: DEFAULT_FPS,
            camera: CameraPath::default(),
            rescale: true,
            image_prefix: "frame_".to_string(),
            output_filename: "out.mp4".to_string(),
        }
    }
}

impl MovieConfig {
    pub fn validate(&self) -> Result<()> {
        if self.nframes == 0 {
            return Err(RenderError::Configuration(
                "`nframes` must be a positive integer".to_string(),
            ));
        }
        if self.nframes > 10_000 {
            return Err(RenderError::Configuration(
                "`nframes` cannot exceed 10000 (four-digit frame index)".to_string(),
            ));
        }
        if self.size == 0 {
            return Err(RenderError::Configuration(
                "`size` must be a positive integer".to_string(),
            ));
        }
        if self.fps == 0 {
            return Err(RenderError::Configuration(
                "`fps` must be a positive integer".to_string(),
            ));
        }
        for (name, value) in [
            ("image_prefix", &self.image_prefix),
            ("output_filename", &self.output_filename),
        ] {
            if value.contains(['/', '\\', '%']) {
                return Err(RenderError::Configuration(format!(
                    "`{name}` must be a plain file name, got `{value}`"
                )));
            }
        }
        if self.output_filename.trim().is_empty() {
            return Err(RenderError::Configuration(
                "`output_filename` must not be empty".to_string(),
            ));
        }
        self.camera.validate()
    }
}

/// One movie: frames and video are written into `output_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub output_dir: PathBuf,
    pub config: MovieConfig,
}

impl RenderJob {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            config: MovieConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MovieConfig) -> Self {
        self.config = config;
        self
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{index:04}.png", self.config.image_prefix))
    }

    fn partial_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{index:04}{PARTIAL_SUFFIX}", self.config.image_prefix))
    }

    fn fingerprint_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}{FINGERPRINT_SUFFIX}", self.config.image_prefix))
    }

    /// Index of a finished frame file name written by this job, if it is one.
    fn frame_index(&self, name: &str) -> Option<usize> {
        let digits = name
            .strip_prefix(&self.config.image_prefix)?
            .strip_suffix(".png")?;
        if digits.len() == 4 && digits.bytes().all(|byte| byte.is_ascii_digit()) {
            digits.parse().ok()
        } else {
            None
        }
    }

    pub fn frame_pattern(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}%04d.png", self.config.image_prefix))
    }

    pub fn video_path(&self) -> PathBuf {
        self.output_dir.join(&self.config.output_filename)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieOutput {
    pub frames: Vec<PathBuf>,
    pub video: PathBuf,
    pub rendered: usize,
    pub reused: usize,
}

/// Everything that decides the pixels of a frame. Frames on disk are only
/// reused while the stored fingerprint matches the current job.
#[derive(Debug, Serialize)]
struct JobFingerprint<'a> {
    shape: [usize; 3],
    data_range: Option<(f32, f32)>,
    nframes: usize,
    size: usize,
    camera: CameraPath,
    rescale: bool,
    colormap: Colormap,
    transfer_function: Option<&'a TransferFunction>,
}

impl<'a> JobFingerprint<'a> {
    fn new(dataset: &RenderableDataset, config: &'a MovieConfig) -> Self {
        Self {
            shape: dataset.shape(),
            data_range: dataset.finite_range(),
            nframes: config.nframes,
            size: config.size,
            camera: config.camera,
            rescale: config.rescale,
            colormap: config.colormap,
            transfer_function: config.transfer_function.as_ref(),
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|error| RenderError::Configuration(error.to_string()))
    }
}

#[derive(Clone)]
pub struct MovieRenderer {
    encoder: Arc<dyn VideoEncoder>,
    observer: Option<FrameObserver>,
}

impl std::fmt::Debug for MovieRenderer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MovieRenderer")
            .field("encoder", &self.encoder.name())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl MovieRenderer {
    pub fn new(encoder: Arc<dyn VideoEncoder>) -> Self {
        Self {
            encoder,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: FrameObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn encoder(&self) -> &Arc<dyn VideoEncoder> {
        &self.encoder
    }

    /// Renders every missing frame of `job`, then encodes the full sequence.
    /// Frames already on disk are reused, so a job whose encoding failed can
    /// be re-run without rendering again.
    pub fn render(
        &self,
        dataset: &RenderableDataset,
        job: &RenderJob,
        cancel: &CancelToken,
    ) -> Result<MovieOutput> {
        let (frames, rendered) = self.render_frames(dataset, job, cancel)?;
        let request = EncodeRequest {
            frames: frames.clone(),
            pattern: job.frame_pattern(),
            start_number: 0,
            fps: job.config.fps,
            output: job.video_path(),
        };
        log::info!(
            "encoding {} frames with {} into {}",
            frames.len(),
            self.encoder.name(),
            request.output.display()
        );
        self.encoder.encode(&request)?;
        Ok(MovieOutput {
            reused: frames.len() - rendered,
            frames,
            video: request.output,
            rendered,
        })
    }

    /// Returns every frame path in index order and how many were newly
    /// rendered.
    pub fn render_frames(
        &self,
        dataset: &RenderableDataset,
        job: &RenderJob,
        cancel: &CancelToken,
    ) -> Result<(Vec<PathBuf>, usize)> {
        let config = &job.config;
        config.validate()?;
        prepare_output_dir(&job.output_dir)?;
        remove_partial_frames(job)?;

        let fingerprint = JobFingerprint::new(dataset, config).to_json()?;
        let fingerprint_path = job.fingerprint_path();
        let stored = fs::read_to_string(&fingerprint_path).ok();
        if stored.as_deref() == Some(fingerprint.as_str()) {
            remove_frames(job, config.nframes)?;
        } else {
            if stored.is_some() {
                log::info!("{}: settings changed, rendering all frames", job.output_dir.display());
            }
            remove_frames(job, 0)?;
            fs::write(&fingerprint_path, fingerprint).map_err(|source| {
                RenderError::Directory {
                    path: fingerprint_path.clone(),
                    source,
                }
            })?;
        }

        let pending = (0..config.nframes)
            .filter(|index| !is_complete(&job.frame_path(*index)))
            .count();
        let transfer = if pending == 0 {
            None
        } else {
            Some(resolve_transfer_function(dataset, config)?)
        };

        let mut frames = Vec::with_capacity(config.nframes);
        let mut rendered = 0;
        for index in 0..config.nframes {
            let path = job.frame_path(index);
            if is_complete(&path) {
                log::debug!("reusing existing frame {}", path.display());
                frames.push(path);
                continue;
            }
            if cancel.is_cancelled() {
                log::warn!("render of {} cancelled at frame {index}", job.output_dir.display());
                return Err(RenderError::Cancelled {
                    completed: index,
                    total: config.nframes,
                });
            }
            let Some(transfer) = transfer.as_ref() else {
                break;
            };
            let camera = config.camera.camera(index, config.nframes)?;
            let frame = render_frame(dataset, transfer, &camera, config.size, config.rescale);
            let partial = job.partial_path(index);
            write_rgb_image(&partial, frame.size, frame.size, frame.pixels).map_err(|error| {
                match error {
                    IoError::Write { path, source } => RenderError::Write {
                        path,
                        source: *source,
                    },
                    source => RenderError::Write {
                        path: partial.clone(),
                        source,
                    },
                }
            })?;
            fs::rename(&partial, &path).map_err(|source| RenderError::Directory {
                path: path.clone(),
                source,
            })?;
            log::debug!("rendered frame {index} -> {}", path.display());
            frames.push(path);
            rendered += 1;
            if let Some(observer) = &self.observer {
                observer(index + 1, config.nframes);
            }
        }
        log::info!(
            "{}: {} frames ready ({rendered} rendered, {} reused)",
            job.output_dir.display(),
            frames.len(),
            frames.len() - rendered
        );
        Ok((frames, rendered))
    }
}

fn resolve_transfer_function(
    dataset: &RenderableDataset,
    config: &MovieConfig,
) -> Result<TransferFunction> {
    if let Some(transfer) = &config.transfer_function {
        return Ok(transfer.clone());
    }
    let (low, high) = dataset.finite_range().ok_or_else(|| {
        RenderError::Configuration("dataset has no finite values to render".to_string())
    })?;
    TransferFunction::auto(f64::from(low), f64::from(high), config.colormap)
}

fn prepare_output_dir(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(RenderError::Directory {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "output path exists and is not a directory",
            ),
        });
    }
    fs::create_dir_all(path).map_err(|source| RenderError::Directory {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_partial_frames(job: &RenderJob) -> Result<()> {
    let entries = fs::read_dir(&job.output_dir).map_err(|source| RenderError::Directory {
        path: job.output_dir.clone(),
        source,
    })?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&job.config.image_prefix) && name.ends_with(PARTIAL_SUFFIX) {
            log::warn!("removing incomplete frame {}", entry.path().display());
            fs::remove_file(entry.path()).map_err(|source| RenderError::Directory {
                path: entry.path(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Removes finished frames with an index of `from` or above.
fn remove_frames(job: &RenderJob, from: usize) -> Result<()> {
    let entries = fs::read_dir(&job.output_dir).map_err(|source| RenderError::Directory {
        path: job.output_dir.clone(),
        source,
    })?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(index) = job.frame_index(&name.to_string_lossy()) else {
            continue;
        };
        if index >= from {
            log::debug!("removing stale frame {}", entry.path().display());
            fs::remove_file(entry.path()).map_err(|source| RenderError::Directory {
                path: entry.path(),
                source,
            })?;
        }
    }
    Ok(())
}

fn is_complete(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false)
}
