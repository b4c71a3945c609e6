use std::path::Path;
use std::sync::Arc;

use crate::model::Cube;
use crate::render::{
    CancelToken, Colormap, FfmpegEncoder, MovieOutput, MovieRenderer, RenderJob,
    RenderableDataset, Resampling, TransferFunction, VideoEncoder,
};

use super::Result;

#[derive(Debug, Clone)]
pub struct RenderService {
    renderer: MovieRenderer,
}

impl Default for RenderService {
    fn default() -> Self {
        Self::with_encoder(Arc::new(FfmpegEncoder::default()))
    }
}

impl RenderService {
    pub fn with_encoder(encoder: Arc<dyn VideoEncoder>) -> Self {
        Self {
            renderer: MovieRenderer::new(encoder),
        }
    }

    pub fn renderer(&self) -> &MovieRenderer {
        &self.renderer
    }

    pub fn adapt(
        &self,
        cube: &Cube,
        spectral_factor: usize,
        resampling: Resampling,
    ) -> Result<RenderableDataset> {
        Ok(RenderableDataset::from_cube(cube, spectral_factor, resampling)?)
    }

    pub fn transfer_function(
        &self,
        low: f64,
        high: f64,
        layers: usize,
        colormap: Colormap,
    ) -> Result<TransferFunction> {
        let mut transfer = TransferFunction::new(low, high)?;
        transfer.add_layers(layers, colormap)?;
        Ok(transfer)
    }

    pub fn plot_transfer_function(
        &self,
        transfer: &TransferFunction,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        transfer.plot(path, 512, 256)?;
        Ok(())
    }

    pub fn render_movie(
        &self,
        dataset: &RenderableDataset,
        job: &RenderJob,
        cancel: &CancelToken,
    ) -> Result<MovieOutput> {
        Ok(self.renderer.render(dataset, job, cancel)?)
    }
}
