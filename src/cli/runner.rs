use std::io::Write;
use std::path::Path;

use clap::Parser;
use serde_json::json;

use crate::analysis::{CubeSummary, NoiseConfig};
use crate::model::Cube;
use crate::render::{CancelToken, Colormap, MovieConfig, RenderJob, TransferFunction};
use crate::runtime::{AppContext, AppError};

use super::types::{AxisInfo, Cli, Commands, CubeInfo};

fn describe(error: AppError) -> String {
    format!("{}: {error}", error.kind())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|error| error.to_string())?
    );
    Ok(())
}

/// Diagnostics shown before any expensive rendering starts.
fn print_summary(summary: &CubeSummary) {
    // stdout going away is not worth failing the run over
    let _ = write_summary(&mut std::io::stdout().lock(), summary);
}

pub(super) fn write_summary(out: &mut impl Write, summary: &CubeSummary) -> std::io::Result<()> {
    writeln!(out, "1-sigma noise level: {}", summary.noise.sigma)?;
    writeln!(out, "Noise floor: {}", summary.floor)?;
    writeln!(out, "Signal peak: {}", summary.peak)
}

/// Reports noise and peak for the selection, then builds the layered
/// transfer function when `custom` is set.
pub(super) fn pre_render(
    app: &AppContext,
    cube: &Cube,
    selected: &Cube,
    noise: &NoiseConfig,
    custom: Option<(usize, Colormap)>,
    out: &mut impl Write,
) -> Result<Option<TransferFunction>, String> {
    let summary = app
        .analysis_service()
        .summarize(cube, selected, noise)
        .map_err(describe)?;
    write_summary(out, &summary).map_err(|error| error.to_string())?;
    let Some((layers, colormap)) = custom else {
        return Ok(None);
    };
    let (low, high) = summary.display_range();
    app.render_service()
        .transfer_function(low, high, layers, colormap)
        .map(Some)
        .map_err(describe)
}

fn cube_info(cube: &Cube) -> CubeInfo {
    let (min, max) = cube.min_max().unzip();
    CubeInfo {
        shape: cube.shape(),
        unit: cube.metadata.unit.clone(),
        pixel_type: format!("{:?}", cube.metadata.pixel_type),
        axes: cube
            .metadata
            .dims
            .iter()
            .map(|dim| AxisInfo {
                axis: dim.axis.to_string(),
                size: dim.size,
                ctype: dim.wcs.ctype.clone(),
                cunit: dim.wcs.cunit.clone(),
                crval: dim.wcs.crval,
                crpix: dim.wcs.crpix,
                cdelt: dim.wcs.cdelt,
            })
            .collect(),
        source: cube
            .metadata
            .source
            .as_ref()
            .map(|path| path.display().to_string()),
        min,
        max,
    }
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let app = AppContext::new();

    match cli.command {
        Commands::Info { input, json } => {
            let cube = app.io_service().read(&input).map_err(describe)?;
            if json {
                print_json(&cube_info(&cube))?;
            } else {
                print!("{cube}");
            }
        }
        Commands::Cut {
            input,
            output,
            selection,
        } => {
            let cube = app.io_service().read(&input).map_err(describe)?;
            let subcube = app
                .analysis_service()
                .select(&cube, &selection.selection())
                .map_err(describe)?;
            app.io_service()
                .write(&output, &subcube)
                .map_err(describe)?;
            println!(
                "{}",
                json!({"status": "ok", "output": output, "shape": subcube.shape()})
            );
        }
        Commands::Stats {
            input,
            selection,
            noise,
        } => {
            let cube = app.io_service().read(&input).map_err(describe)?;
            let selected = app
                .analysis_service()
                .select(&cube, &selection.selection())
                .map_err(describe)?;
            let summary = app
                .analysis_service()
                .summarize(&cube, &selected, &noise.config())
                .map_err(describe)?;
            print_json(&summary)?;
        }
        Commands::Quicklook { input, output } => {
            let cube = app.io_service().read(&input).map_err(describe)?;
            app.io_service()
                .write_projection(&output, &cube.sum_spectral())
                .map_err(describe)?;
            println!("{}", json!({"status": "ok", "output": output}));
        }
        Commands::Transfer {
            low,
            high,
            layers,
            colormap,
            output,
        } => {
            let render = app.render_service();
            let transfer = render
                .transfer_function(low, high, layers, colormap)
                .map_err(describe)?;
            render
                .plot_transfer_function(&transfer, &output)
                .map_err(describe)?;
            println!("{}", json!({"status": "ok", "output": output}));
        }
        Commands::Render {
            input,
            output_dir,
            selection,
            noise,
            spectral_factor,
            resampling,
            nframes,
            size,
            fps,
            colormap,
            custom,
            layers,
            no_rescale,
        } => {
            let cube = app.io_service().read(&input).map_err(describe)?;
            let selected = app
                .analysis_service()
                .select(&cube, &selection.selection())
                .map_err(describe)?;
            let transfer_function = pre_render(
                &app,
                &cube,
                &selected,
                &noise.config(),
                custom.then_some((layers, colormap)),
                &mut std::io::stdout().lock(),
            )?;
            let dataset = app
                .render_service()
                .adapt(&selected, spectral_factor, resampling)
                .map_err(describe)?;
            let job = RenderJob::new(&output_dir).with_config(MovieConfig {
                transfer_function,
                colormap,
                nframes,
                size,
                fps,
                rescale: !no_rescale,
                ..MovieConfig::default()
            });
            let output = app
                .render_service()
                .render_movie(&dataset, &job, &CancelToken::new())
                .map_err(describe)?;
            print_json(&output)?;
        }
        Commands::Run { recipe, report } => {
            run_recipe(&app, &recipe, report.as_deref())?;
        }
    }

    Ok(())
}

fn run_recipe(app: &AppContext, recipe: &Path, report: Option<&Path>) -> Result<(), String> {
    let pipeline = app.pipeline_service();
    let recipe = pipeline.load_recipe(recipe).map_err(describe)?;
    let prepared = pipeline.prepare(&recipe).map_err(describe)?;
    print!("{}", prepared.selected());
    print_summary(prepared.summary());
    let run_report = pipeline
        .render(prepared, &CancelToken::new())
        .map_err(describe)?;
    if let Some(path) = report {
        pipeline
            .save_report(path, &run_report)
            .map_err(describe)?;
    }
    print_json(&run_report)
}
