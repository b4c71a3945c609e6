use ndarray::Array3;

use super::{
    AnalysisError, NoiseConfig, SubcubeSelection, estimate_noise, select_subcube, signal_peak,
    summarize,
};
use crate::model::{AxisRange, CoreError, Cube, CubeMetadata};

/// Alternating +/-0.05 noise everywhere, plus a bright 8x8 source in the
/// spatial window starting at (200, 200) when the cube is large enough.
fn observation(shape: (usize, usize, usize), peak: f32) -> Cube {
    let data = Array3::from_shape_fn(shape, |(s, y, x)| {
        let noise = if (s + y + x) % 2 == 0 { 0.05 } else { -0.05 };
        let in_source = (200..208).contains(&y) && (200..208).contains(&x) && (12..30).contains(&s);
        if in_source { noise + 2.0 } else { noise }
    });
    let metadata = CubeMetadata::from_shape([shape.0, shape.1, shape.2]).with_unit("Jy/beam");
    let mut cube = Cube::new(data, metadata).expect("cube");
    if let Some(voxel) = cube.data.get_mut([20, 204, 204]) {
        *voxel = peak;
    }
    cube
}

#[test]
fn selection_of_signal_region_has_expected_shape() {
    let cube = observation((38, 260, 260), 7.5);
    let selection = SubcubeSelection::new(
        AxisRange::new(11, 38),
        AxisRange::new(172, 260),
        AxisRange::new(172, 260),
    );
    let subcube = select_subcube(&cube, &selection).expect("subcube");
    assert_eq!(subcube.shape(), [27, 88, 88]);
    assert_eq!(signal_peak(&subcube).expect("peak").value, 7.5);
    assert_eq!(signal_peak(&subcube).expect("peak").unit.as_deref(), Some("Jy/beam"));
}

#[test]
fn full_selection_returns_whole_cube() {
    let cube = observation((4, 6, 6), 1.0);
    let subcube = select_subcube(&cube, &SubcubeSelection::default()).expect("subcube");
    assert_eq!(subcube.shape(), cube.shape());
}

#[test]
fn out_of_range_selection_is_rejected() {
    let cube = observation((4, 6, 6), 1.0);
    let selection =
        SubcubeSelection::new(AxisRange::new(0, 4), AxisRange::new(2, 9), AxisRange::full());
    assert!(matches!(
        select_subcube(&cube, &selection),
        Err(AnalysisError::Core(CoreError::AxisOutOfBounds { .. }))
    ));
}

#[test]
fn noise_only_reflects_signal_free_voxels() {
    let cube = observation((38, 220, 220), 7.5);
    let estimate = estimate_noise(&cube, &NoiseConfig::default()).expect("noise");
    assert_eq!(estimate.signal_free_pixels, 220 * 220 - 64);
    assert_eq!(estimate.included_voxels, 38 * (220 * 220 - 64));
    assert!((estimate.sigma.value - 0.05).abs() < 1e-4, "sigma = {}", estimate.sigma);
    assert!(cube.std().expect("std").value > 0.1);
}

#[test]
fn summary_combines_noise_floor_and_peak() {
    let cube = observation((38, 220, 220), 7.5);
    let selection = SubcubeSelection::new(
        AxisRange::new(11, 38),
        AxisRange::new(172, 220),
        AxisRange::new(172, 220),
    );
    let subcube = select_subcube(&cube, &selection).expect("subcube");
    let summary = summarize(&cube, &subcube, &NoiseConfig::default()).expect("summary");
    let (low, high) = summary.display_range();
    assert!((low - 0.15).abs() < 1e-3);
    assert_eq!(high, 7.5);
    assert_eq!(summary.floor.unit.as_deref(), Some("Jy/beam"));
}

#[test]
fn threshold_selecting_nothing_is_an_error() {
    let cube = observation((4, 6, 6), 1.0);
    let config = NoiseConfig {
        threshold: -100.0,
        ..NoiseConfig::default()
    };
    assert!(matches!(
        estimate_noise(&cube, &config),
        Err(AnalysisError::Core(CoreError::EmptySelection { .. }))
    ));
}

#[test]
fn non_finite_parameters_are_rejected() {
    let cube = observation((4, 6, 6), 1.0);
    let config = NoiseConfig {
        threshold: f32::NAN,
        ..NoiseConfig::default()
    };
    assert!(matches!(
        estimate_noise(&cube, &config),
        Err(AnalysisError::InvalidParams(_))
    ));
    let config = NoiseConfig {
        floor_sigma: -1.0,
        ..NoiseConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn noise_config_reads_partial_yaml() {
    let config: NoiseConfig = serde_yaml::from_str("threshold: 0.5").expect("config");
    assert_eq!(config.threshold, 0.5);
    assert_eq!(config.floor_sigma, 3.0);
}
