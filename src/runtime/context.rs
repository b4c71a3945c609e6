use std::sync::Arc;

use crate::render::VideoEncoder;

use super::{AnalysisService, IoService, PipelineService, RenderService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    io_service: IoService,
    analysis_service: AnalysisService,
    render_service: RenderService,
    pipeline_service: PipelineService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose movies are encoded by `encoder` instead of `ffmpeg`.
    pub fn with_encoder(encoder: Arc<dyn VideoEncoder>) -> Self {
        let render_service = RenderService::with_encoder(encoder);
        Self {
            pipeline_service: PipelineService::new(render_service.clone()),
            render_service,
            ..Self::default()
        }
    }

    pub fn io_service(&self) -> &IoService {
        &self.io_service
    }

    pub fn analysis_service(&self) -> &AnalysisService {
        &self.analysis_service
    }

    pub fn render_service(&self) -> &RenderService {
        &self.render_service
    }

    pub fn pipeline_service(&self) -> &PipelineService {
        &self.pipeline_service
    }
}
