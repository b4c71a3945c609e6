use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid analysis parameters: {0}")]
    InvalidParams(String),

    #[error("core cube error: {0}")]
    Core(#[from] CoreError),
}
