use crate::analysis::AnalysisError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::render::RenderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("recipe parse failure: {0}")]
    Parse(String),

    #[error("recipe I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("recipe serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("recipe YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("cube file failure: {0}")]
    Format(#[from] IoError),

    #[error("cube analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("cube validation failed: {0}")]
    Core(#[from] CoreError),
}
