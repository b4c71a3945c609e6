use std::path::Path;

use crate::render::CancelToken;
use crate::workflow::{
    PreparedWorkflow, Recipe, WorkflowReport, load_recipe, prepare_workflow, save_report,
};

use super::{RenderService, Result};

#[derive(Debug, Clone, Default)]
pub struct PipelineService {
    render: RenderService,
}

impl PipelineService {
    pub fn new(render: RenderService) -> Self {
        Self { render }
    }

    pub fn load_recipe(&self, path: impl AsRef<Path>) -> Result<Recipe> {
        Ok(load_recipe(path)?)
    }

    pub fn prepare(&self, recipe: &Recipe) -> Result<PreparedWorkflow> {
        Ok(prepare_workflow(recipe)?)
    }

    pub fn render(
        &self,
        prepared: PreparedWorkflow,
        cancel: &CancelToken,
    ) -> Result<WorkflowReport> {
        Ok(prepared.render(self.render.renderer(), cancel)?)
    }

    pub fn run(&self, recipe: &Recipe, cancel: &CancelToken) -> Result<WorkflowReport> {
        let prepared = self.prepare(recipe)?;
        self.render(prepared, cancel)
    }

    pub fn save_report(&self, path: impl AsRef<Path>, report: &WorkflowReport) -> Result<()> {
        save_report(path, report)?;
        Ok(())
    }
}
