mod error;
mod execute;
mod io;
mod recipe;
mod report;

#[cfg(test)]
mod tests;

pub use error::{PipelineError, Result};
pub use execute::{PreparedWorkflow, prepare_workflow, run_workflow};
pub use io::{load_recipe, save_report};
pub use recipe::{MovieRecipe, Recipe, RenderRecipe, TransferRecipe};
pub use report::{MovieReport, StepReport, WorkflowReport};
