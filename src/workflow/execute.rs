use std::time::Instant;

use crate::analysis::{CubeSummary, select_subcube, summarize};
use crate::formats::{read_cube, write_projection};
use crate::model::Cube;
use crate::render::{CancelToken, MovieRenderer, RenderJob, RenderableDataset, TransferFunction};

use super::{MovieReport, Recipe, Result, StepReport, WorkflowReport};

/// Everything computed before rendering: cheap enough to inspect before
/// committing to the movies.
#[derive(Debug, Clone)]
pub struct PreparedWorkflow {
    recipe: Recipe,
    input_shape: [usize; 3],
    selected: Cube,
    summary: CubeSummary,
    dataset: RenderableDataset,
    transfer: Option<TransferFunction>,
    steps: Vec<StepReport>,
}

fn timed<T>(steps: &mut Vec<StepReport>, step: &str, run: impl FnOnce() -> Result<T>) -> Result<T> {
    let started = Instant::now();
    let value = run()?;
    steps.push(StepReport {
        step: step.to_string(),
        duration_ms: started.elapsed().as_millis(),
    });
    Ok(value)
}

/// Loads the cube and runs every step up to, but not including, the movies.
pub fn prepare_workflow(recipe: &Recipe) -> Result<PreparedWorkflow> {
    recipe.validate()?;
    let mut steps = Vec::new();

    let cube = timed(&mut steps, "load", || Ok(read_cube(&recipe.input)?))?;
    log::info!("loaded {}\n{cube}", recipe.input.display());

    if let Some(path) = &recipe.quicklook {
        timed(&mut steps, "quicklook", || {
            Ok(write_projection(path, &cube.sum_spectral())?)
        })?;
        log::info!("wrote spectral-sum quick-look to {}", path.display());
    }

    let selected = timed(&mut steps, "select", || {
        Ok(select_subcube(&cube, &recipe.subcube)?)
    })?;
    let summary = timed(&mut steps, "summarize", || {
        Ok(summarize(&cube, &selected, &recipe.noise)?)
    })?;
    log::info!(
        "noise {} (floor {}), signal peak {}",
        summary.noise.sigma,
        summary.floor,
        summary.peak
    );

    let dataset = timed(&mut steps, "adapt", || {
        Ok(RenderableDataset::from_cube(
            &selected,
            recipe.render.spectral_factor,
            recipe.render.resampling,
        )?)
    })?;

    let transfer = if recipe.needs_custom_transfer() {
        let (low, high) = summary.display_range();
        let transfer = timed(&mut steps, "transfer_function", || {
            recipe.transfer_function.build(low, high)
        })?;
        if let Some(path) = &recipe.transfer_function.preview {
            timed(&mut steps, "transfer_preview", || Ok(transfer.plot(path, 512, 256)?))?;
            log::info!("wrote transfer function preview to {}", path.display());
        }
        Some(transfer)
    } else {
        None
    };

    Ok(PreparedWorkflow {
        recipe: recipe.clone(),
        input_shape: cube.shape(),
        selected,
        summary,
        dataset,
        transfer,
        steps,
    })
}

impl PreparedWorkflow {
    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn selected(&self) -> &Cube {
        &self.selected
    }

    pub fn summary(&self) -> &CubeSummary {
        &self.summary
    }

    pub fn dataset(&self) -> &RenderableDataset {
        &self.dataset
    }

    pub fn transfer_function(&self) -> Option<&TransferFunction> {
        self.transfer.as_ref()
    }

    /// Renders every movie of the recipe in order. A failure stops the run;
    /// frames already written stay on disk for the next attempt.
    pub fn render(self, renderer: &MovieRenderer, cancel: &CancelToken) -> Result<WorkflowReport> {
        let mut steps = self.steps;
        let mut movies = Vec::with_capacity(self.recipe.movies.len());
        for movie in &self.recipe.movies {
            let transfer = if movie.custom_transfer_function {
                self.transfer.clone()
            } else {
                None
            };
            let job = RenderJob::new(self.recipe.output_dir.join(&movie.name))
                .with_config(movie.config(transfer));
            let output = timed(&mut steps, &format!("movie:{}", movie.name), || {
                Ok(renderer.render(&self.dataset, &job, cancel)?)
            })?;
            log::info!("movie `{}` written to {}", movie.name, output.video.display());
            movies.push(MovieReport {
                name: movie.name.clone(),
                frames: output.frames,
                rendered: output.rendered,
                reused: output.reused,
                video: output.video,
            });
        }

        Ok(WorkflowReport {
            recipe_name: self.recipe.name.clone(),
            input: self.recipe.input.clone(),
            input_shape: self.input_shape,
            selected_shape: self.selected.shape(),
            renderable_shape: self.dataset.shape(),
            transfer_bounds: self.transfer.as_ref().map(TransferFunction::bounds),
            quicklook: self.recipe.quicklook.clone(),
            transfer_preview: self.recipe.transfer_function.preview.clone(),
            summary: self.summary,
            movies,
            steps,
        })
    }
}

pub fn run_workflow(
    recipe: &Recipe,
    renderer: &MovieRenderer,
    cancel: &CancelToken,
) -> Result<WorkflowReport> {
    prepare_workflow(recipe)?.render(renderer, cancel)
}
