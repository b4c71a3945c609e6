use std::fmt;

use crate::analysis::AnalysisError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::render::RenderError;
use crate::workflow::PipelineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cube error: {0}")]
    Core(#[from] CoreError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("analysis service error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("render service error: {0}")]
    Render(#[from] RenderError),

    #[error("pipeline service error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// User-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, unreadable, or malformed input file.
    Load,
    /// Index range outside a cube or empty.
    Range,
    /// Invalid numeric bounds or settings.
    Configuration,
    /// Output location cannot be created or written.
    Directory,
    /// External video encoder missing or failed; frames are kept.
    Encoding,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Load => "load error",
            ErrorKind::Range => "range error",
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Directory => "directory error",
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Cancelled => "cancelled",
        };
        formatter.write_str(name)
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Core(err) => core_kind(err),
            AppError::Io(err) => io_kind(err),
            AppError::Analysis(err) => analysis_kind(err),
            AppError::Render(err) => render_kind(err),
            AppError::Pipeline(err) => pipeline_kind(err),
        }
    }
}

fn core_kind(err: &CoreError) -> ErrorKind {
    match err {
        CoreError::AxisOutOfBounds { .. }
        | CoreError::EmptyRange { .. }
        | CoreError::InvalidRange(_)
        | CoreError::MaskShapeMismatch { .. } => ErrorKind::Range,
        CoreError::EmptySelection { .. } => ErrorKind::Configuration,
        CoreError::DimensionalityMismatch { .. }
        | CoreError::DimensionSizeMismatch { .. }
        | CoreError::ZeroSizedDimension { .. }
        | CoreError::InvalidMetadata(_) => ErrorKind::Load,
    }
}

fn io_kind(err: &IoError) -> ErrorKind {
    match err {
        IoError::Core(err) => core_kind(err),
        IoError::Write { .. } => ErrorKind::Directory,
        _ => ErrorKind::Load,
    }
}

fn analysis_kind(err: &AnalysisError) -> ErrorKind {
    match err {
        AnalysisError::InvalidParams(_) => ErrorKind::Configuration,
        AnalysisError::Core(err) => core_kind(err),
    }
}

fn render_kind(err: &RenderError) -> ErrorKind {
    match err {
        RenderError::Configuration(_) => ErrorKind::Configuration,
        RenderError::Directory { .. } | RenderError::Write { .. } => ErrorKind::Directory,
        RenderError::Encoding(_) => ErrorKind::Encoding,
        RenderError::Cancelled { .. } => ErrorKind::Cancelled,
        RenderError::Core(err) => core_kind(err),
    }
}

fn pipeline_kind(err: &PipelineError) -> ErrorKind {
    match err {
        PipelineError::Parse(_) | PipelineError::SerdeJson(_) | PipelineError::SerdeYaml(_) => {
            ErrorKind::Configuration
        }
        PipelineError::Io(_) => ErrorKind::Load,
        PipelineError::Format(err) => io_kind(err),
        PipelineError::Analysis(err) => analysis_kind(err),
        PipelineError::Render(err) => render_kind(err),
        PipelineError::Core(err) => core_kind(err),
    }
}
