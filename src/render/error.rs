use std::path::PathBuf;

use crate::formats::IoError;
use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    Configuration(String),

    #[error("cannot prepare output directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    #[error("video encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    #[error("rendering cancelled after {completed} of {total} frames")]
    Cancelled { completed: usize, total: usize },

    #[error("core cube error: {0}")]
    Core(#[from] CoreError),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("video encoder `{program}` is not available: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("video encoder `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("no frames to encode")]
    NoFrames,
}
