use std::sync::Arc;

use ndarray::Array3;
use tempfile::tempdir;

use super::{AppContext, AppError, ErrorKind};
use crate::analysis::SubcubeSelection;
use crate::model::{AxisRange, Cube, CoreError};
use crate::render::{
    CancelToken, EncodeError, EncodeRequest, MovieConfig, RenderError, RenderJob, Resampling,
    VideoEncoder,
};

struct MissingEncoder;

impl VideoEncoder for MissingEncoder {
    fn name(&self) -> &str {
        "missing"
    }

    fn encode(&self, _request: &EncodeRequest) -> Result<(), EncodeError> {
        Err(EncodeError::Unavailable {
            program: "missing".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
        })
    }
}

fn ramp() -> Cube {
    Cube::from_data_with_default_metadata(Array3::from_shape_fn((6, 8, 8), |(s, y, x)| {
        (s * 64 + y * 8 + x) as f32
    }))
}

#[test]
fn io_service_round_trips_fits_and_rejects_unknown_extensions() {
    let dir = tempdir().expect("tempdir");
    let context = AppContext::new();
    let path = dir.path().join("ramp.fits");
    context.io_service().write(&path, &ramp()).expect("write");
    let cube = context.io_service().read(&path).expect("read");
    assert_eq!(cube.shape(), [6, 8, 8]);
    assert_eq!(cube.metadata.source.as_deref(), Some(path.as_path()));

    let err = context
        .io_service()
        .read(dir.path().join("ramp.hdf5"))
        .expect_err("unsupported");
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn errors_map_onto_user_facing_kinds() {
    let context = AppContext::new();
    let selection =
        SubcubeSelection::new(AxisRange::new(0, 9), AxisRange::full(), AxisRange::full());
    let err = context
        .analysis_service()
        .select(&ramp(), &selection)
        .expect_err("out of bounds");
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = context
        .render_service()
        .transfer_function(10.0, 3.0, 5, Default::default())
        .expect_err("inverted bounds");
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let empty = AppError::from(CoreError::EmptySelection { statistic: "std" });
    assert_eq!(empty.kind(), ErrorKind::Configuration);
    let cancelled = AppError::from(RenderError::Cancelled {
        completed: 2,
        total: 5,
    });
    assert_eq!(cancelled.kind(), ErrorKind::Cancelled);

    let dir = tempdir().expect("tempdir");
    let unwritable = dir.path().join("missing").join("cut.fits");
    let err = context
        .io_service()
        .write(&unwritable, &ramp())
        .expect_err("parent directory is missing");
    assert_eq!(err.kind(), ErrorKind::Directory);

    let projection = ramp().sum_spectral();
    let err = context
        .io_service()
        .write_projection(dir.path().join("missing").join("sumproj.png"), &projection)
        .expect_err("parent directory is missing");
    assert_eq!(err.kind(), ErrorKind::Directory);
}

#[test]
fn missing_encoder_is_an_encoding_error_and_keeps_frames() {
    let dir = tempdir().expect("tempdir");
    let context = AppContext::with_encoder(Arc::new(MissingEncoder));
    let dataset = context
        .render_service()
        .adapt(&ramp(), 1, Resampling::Nearest)
        .expect("dataset");
    let job = RenderJob::new(dir.path().join("movie")).with_config(MovieConfig {
        nframes: 2,
        size: 8,
        ..MovieConfig::default()
    });

    let err = context
        .render_service()
        .render_movie(&dataset, &job, &CancelToken::new())
        .expect_err("encoder missing");
    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert!(job.frame_path(0).is_file());
    assert!(job.frame_path(1).is_file());
}
