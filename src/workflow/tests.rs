use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::Array3;
use tempfile::tempdir;

use super::{
    MovieRecipe, PipelineError, Recipe, load_recipe, prepare_workflow, run_workflow, save_report,
};
use crate::analysis::SubcubeSelection;
use crate::formats::write_cube;
use crate::model::{AxisRange, Cube, CubeMetadata};
use crate::render::{
    CancelToken, Colormap, EncodeError, EncodeRequest, MovieRenderer, RenderError, VideoEncoder,
};

#[derive(Default)]
struct FakeEncoder {
    outputs: Mutex<Vec<std::path::PathBuf>>,
    fail: bool,
}

impl VideoEncoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        self.outputs.lock().expect("lock").push(request.output.clone());
        if self.fail {
            return Err(EncodeError::Unavailable {
                program: "fake".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            });
        }
        fs::write(&request.output, b"video").expect("write video");
        Ok(())
    }
}

/// +/-0.05 noise with a 2.0 source occupying a 4x4 spatial block.
fn write_observation(path: &Path) -> Cube {
    let shape = (12, 20, 20);
    let data = Array3::from_shape_fn(shape, |(s, y, x)| {
        let noise = if (s + y + x) % 2 == 0 { 0.05 } else { -0.05 };
        let in_source = (8..12).contains(&y) && (8..12).contains(&x) && (3..9).contains(&s);
        if in_source { noise + 2.0 } else { noise }
    });
    let metadata = CubeMetadata::from_shape([12, 20, 20]).with_unit("Jy/beam");
    let cube = Cube::new(data, metadata).expect("cube");
    write_cube(path, &cube).expect("write cube");
    cube
}

fn observation_recipe(dir: &Path) -> Recipe {
    let input = dir.join("observation.fits");
    write_observation(&input);
    let mut recipe = Recipe::new(input);
    recipe.output_dir = dir.to_path_buf();
    recipe.subcube = SubcubeSelection::new(
        AxisRange::new(2, 10),
        AxisRange::new(4, 16),
        AxisRange::new(4, 16),
    );
    recipe.render.spectral_factor = 2;
    recipe
}

fn small_movie(name: &str, nframes: usize, custom: bool) -> MovieRecipe {
    MovieRecipe {
        custom_transfer_function: custom,
        nframes,
        size: 16,
        ..MovieRecipe::new(name)
    }
}

#[test]
fn yaml_recipe_resolves_paths_against_its_directory() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("recipe.yaml");
    fs::write(
        &path,
        "name: rscl\n\
         input: cube.fits\n\
         subcube:\n  spectral: {start: 11, end: 38}\n  y: {start: 172}\n\
         noise: {threshold: 1.0}\n\
         render: {spectral_factor: 3}\n\
         transfer_function: {layers: 15, colormap: hsv, preview: tf.png}\n\
         movies:\n  - name: defaults\n  - name: custom\n\
         \x20   custom_transfer_function: true\n    nframes: 60\n    size: 512\n",
    )
    .expect("write recipe");

    let recipe = load_recipe(&path).expect("recipe");
    assert_eq!(recipe.name.as_deref(), Some("rscl"));
    assert_eq!(recipe.input, dir.path().join("cube.fits"));
    assert_eq!(recipe.output_dir, dir.path().join("."));
    assert_eq!(recipe.subcube.spectral, AxisRange::new(11, 38));
    assert_eq!(recipe.subcube.y.start, Some(172));
    assert_eq!(recipe.subcube.y.end, None);
    assert_eq!(recipe.noise.floor_sigma, 3.0);
    assert_eq!(recipe.render.spectral_factor, 3);
    assert_eq!(recipe.transfer_function.colormap, Colormap::Hsv);
    assert_eq!(recipe.transfer_function.preview, Some(dir.path().join("tf.png")));
    assert_eq!(recipe.movies.len(), 2);
    assert_eq!(recipe.movies[0].nframes, 30);
    assert_eq!(recipe.movies[0].size, 256);
    assert!(!recipe.movies[0].custom_transfer_function);
    assert_eq!(recipe.movies[1].nframes, 60);
    assert_eq!(recipe.movies[1].size, 512);
}

#[test]
fn invalid_recipes_are_rejected() {
    let mut recipe = Recipe::new("cube.fits");
    recipe.render.spectral_factor = 0;
    assert!(matches!(recipe.validate(), Err(PipelineError::Parse(_))));

    let mut recipe = Recipe::new("cube.fits");
    recipe.movies = vec![MovieRecipe::new("a"), MovieRecipe::new("a")];
    assert!(matches!(recipe.validate(), Err(PipelineError::Parse(_))));

    let mut recipe = Recipe::new("cube.fits");
    recipe.movies = vec![small_movie("a", 0, false)];
    assert!(matches!(recipe.validate(), Err(PipelineError::Parse(_))));

    for name in ["../escape", "/tmp/movie", "nested/movie", "nested\\movie", "..", "."] {
        let mut recipe = Recipe::new("cube.fits");
        recipe.movies = vec![MovieRecipe::new(name)];
        assert!(
            matches!(recipe.validate(), Err(PipelineError::Parse(_))),
            "`{name}` should be rejected"
        );
    }
    let mut recipe = Recipe::new("cube.fits");
    recipe.movies = vec![MovieRecipe::new("orbit-2")];
    assert!(recipe.validate().is_ok());
}

#[test]
fn prepared_workflow_reports_noise_and_peak_before_rendering() {
    let dir = tempdir().expect("tempdir");
    let mut recipe = observation_recipe(dir.path());
    recipe.quicklook = Some(dir.path().join("sum.png"));
    recipe.transfer_function.preview = Some(dir.path().join("tf.png"));

    let prepared = prepare_workflow(&recipe).expect("prepare");
    assert_eq!(prepared.selected().shape(), [8, 12, 12]);
    assert_eq!(prepared.dataset().shape(), [16, 12, 12]);
    let summary = prepared.summary();
    assert!((summary.noise.sigma.value - 0.05).abs() < 1e-4);
    assert!((summary.floor.value - 0.15).abs() < 1e-3);
    assert!((summary.peak.value - 2.05).abs() < 1e-4);
    assert_eq!(summary.peak.unit.as_deref(), Some("Jy/beam"));
    let bounds = prepared.transfer_function().expect("custom transfer").bounds();
    assert!((bounds.1 - 2.05).abs() < 1e-4);
    assert!(dir.path().join("sum.png").is_file());
    assert!(dir.path().join("tf.png").is_file());
    assert!(!dir.path().join("defaults").exists());
}

#[test]
fn workflow_renders_every_movie_and_saves_report() {
    let dir = tempdir().expect("tempdir");
    let mut recipe = observation_recipe(dir.path());
    recipe.movies = vec![small_movie("defaults", 3, false), small_movie("custom", 4, true)];
    let encoder = Arc::new(FakeEncoder::default());
    let renderer = MovieRenderer::new(encoder.clone());

    let report = run_workflow(&recipe, &renderer, &CancelToken::new()).expect("workflow");
    assert_eq!(report.input_shape, [12, 20, 20]);
    assert_eq!(report.selected_shape, [8, 12, 12]);
    assert_eq!(report.renderable_shape, [16, 12, 12]);
    assert_eq!(report.movies.len(), 2);
    assert_eq!(report.movies[0].frames.len(), 3);
    assert_eq!(report.movies[1].frames.len(), 4);
    assert_eq!(report.movies[1].video, dir.path().join("custom").join("out.mp4"));
    assert!(dir.path().join("custom").join("frame_0003.png").is_file());
    assert!(report.transfer_bounds.is_some());
    assert!(report.steps.iter().any(|step| step.step == "movie:custom"));
    assert_eq!(encoder.outputs.lock().expect("lock").len(), 2);

    let saved = dir.path().join("report.json");
    save_report(&saved, &report).expect("save");
    let raw = fs::read_to_string(&saved).expect("read report");
    let restored: super::WorkflowReport = serde_json::from_str(&raw).expect("parse report");
    assert_eq!(restored, report);
}

#[test]
fn degenerate_transfer_bounds_fail_before_rendering() {
    let dir = tempdir().expect("tempdir");
    let mut recipe = observation_recipe(dir.path());
    recipe.transfer_function.low = Some(5.0);
    recipe.transfer_function.high = Some(5.0);
    recipe.movies = vec![small_movie("custom", 2, true)];
    let renderer = MovieRenderer::new(Arc::new(FakeEncoder::default()));

    let result = run_workflow(&recipe, &renderer, &CancelToken::new());
    assert!(matches!(
        result,
        Err(PipelineError::Render(RenderError::Configuration(_)))
    ));
    assert!(!dir.path().join("custom").exists());
}

#[test]
fn encoder_failure_is_retry_safe() {
    let dir = tempdir().expect("tempdir");
    let mut recipe = observation_recipe(dir.path());
    recipe.movies = vec![small_movie("retry", 3, false)];

    let failing = MovieRenderer::new(Arc::new(FakeEncoder {
        fail: true,
        ..FakeEncoder::default()
    }));
    let result = run_workflow(&recipe, &failing, &CancelToken::new());
    assert!(matches!(
        result,
        Err(PipelineError::Render(RenderError::Encoding(_)))
    ));
    assert!(dir.path().join("retry").join("frame_0002.png").is_file());

    let working = MovieRenderer::new(Arc::new(FakeEncoder::default()));
    let report = run_workflow(&recipe, &working, &CancelToken::new()).expect("retry");
    assert_eq!(report.movies[0].rendered, 0);
    assert_eq!(report.movies[0].reused, 3);
}

#[test]
fn missing_input_is_a_format_error() {
    let dir = tempdir().expect("tempdir");
    let recipe = Recipe::new(dir.path().join("absent.fits"));
    assert!(matches!(
        prepare_workflow(&recipe),
        Err(PipelineError::Format(_))
    ));
}
