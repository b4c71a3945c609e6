use ndarray::Array3;

use super::runner::pre_render;
use crate::analysis::NoiseConfig;
use crate::model::Cube;
use crate::render::Colormap;
use crate::runtime::AppContext;

/// Alternating-sign noise with one bright spatial pixel.
fn noisy_source() -> Cube {
    Cube::from_data_with_default_metadata(Array3::from_shape_fn((4, 6, 6), |(s, y, x)| {
        if (y, x) == (3, 3) {
            5.0
        } else if s % 2 == 0 {
            0.1
        } else {
            -0.1
        }
    }))
}

#[test]
fn default_render_still_reports_noise_and_peak() {
    let app = AppContext::new();
    let cube = noisy_source();
    let mut out = Vec::new();
    let transfer = pre_render(&app, &cube, &cube, &NoiseConfig::default(), None, &mut out)
        .expect("summary");
    assert!(transfer.is_none());
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("1-sigma noise level:"), "{text}");
    assert!(text.contains("Noise floor:"), "{text}");
    assert!(text.contains("Signal peak: 5"), "{text}");
}

#[test]
fn custom_render_builds_a_layered_transfer_function() {
    let app = AppContext::new();
    let cube = noisy_source();
    let mut out = Vec::new();
    let transfer = pre_render(
        &app,
        &cube,
        &cube,
        &NoiseConfig::default(),
        Some((5, Colormap::Hsv)),
        &mut out,
    )
    .expect("transfer function");
    assert!(transfer.is_some());
    assert!(!out.is_empty());
}
