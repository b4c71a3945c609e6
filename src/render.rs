mod camera;
mod cancel;
mod colormap;
mod dataset;
mod encoder;
mod error;
mod movie;
mod raycast;
mod transfer;


pub use camera::{Camera, CameraPath};
pub use cancel::CancelToken;
pub use colormap::Colormap;
pub use dataset::{RenderableDataset, Resampling};
pub use encoder::{EncodeRequest, FfmpegEncoder, VideoEncoder};
pub use error::{EncodeError, RenderError, Result};
pub use movie::{
    DEFAULT_FPS, DEFAULT_NFRAMES, DEFAULT_SIZE, FrameObserver, MovieConfig, MovieOutput,
    MovieRenderer, RenderJob,
};
pub use raycast::{Frame, STEP, render_frame};
pub use transfer::{AUTO_LAYERS, DEFAULT_BINS, TransferFunction};
