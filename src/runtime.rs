mod analysis_service;
mod context;
mod error;
mod io_service;
mod pipeline_service;
mod render_service;

#[cfg(test)]
mod tests;

pub use analysis_service::AnalysisService;
pub use context::AppContext;
pub use error::{AppError, ErrorKind, Result};
pub use io_service::IoService;
pub use pipeline_service::PipelineService;
pub use render_service::RenderService;
