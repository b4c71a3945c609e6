use nalgebra::Vector3;
use ndarray::Array3;
use rayon::prelude::*;

use super::{Camera, RenderableDataset, TransferFunction};

/// Ray-marching step in voxels.
pub const STEP: f64 = 0.5;
const OPAQUE: f32 = 0.995;

/// Square RGB8 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub size: usize,
    pub pixels: Vec<u8>,
}

/// Orthographic emission-absorption rendering of the whole volume. The
/// field of view is the volume's bounding sphere, so every orbit angle
/// keeps the cube in frame.
pub fn render_frame(
    dataset: &RenderableDataset,
    transfer: &TransferFunction,
    camera: &Camera,
    size: usize,
    rescale: bool,
) -> Frame {
    let [channels, height, width] = dataset.shape();
    let half = Vector3::new(width as f64, height as f64, channels as f64) / 2.0;
    let radius = half.norm();
    let data = dataset.data();

    let mut radiance = vec![0.0_f32; size * size * 3];
    radiance
        .par_chunks_mut(size * 3)
        .enumerate()
        .for_each(|(row, line)| {
            let v = (0.5 - (row as f64 + 0.5) / size as f64) * 2.0 * radius;
            for column in 0..size {
                let u = ((column as f64 + 0.5) / size as f64 - 0.5) * 2.0 * radius;
                let origin =
                    camera.right * u + camera.up * v - camera.direction * (radius + 1.0);
                let rgb = cast_ray(data, transfer, &origin, &camera.direction, &half);
                line[column * 3..column * 3 + 3].copy_from_slice(&rgb);
            }
        });

    let brightest = radiance.iter().copied().fold(0.0_f32, f32::max);
    let gain = if rescale && brightest > 0.0 {
        1.0 / brightest
    } else {
        1.0
    };
    let pixels = radiance
        .into_iter()
        .map(|value| ((value * gain).clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    Frame { size, pixels }
}

fn cast_ray(
    data: &Array3<f32>,
    transfer: &TransferFunction,
    origin: &Vector3<f64>,
    direction: &Vector3<f64>,
    half: &Vector3<f64>,
) -> [f32; 3] {
    let mut color = [0.0_f32; 3];
    let Some((enter, exit)) = intersect_box(origin, direction, half) else {
        return color;
    };
    let mut opacity = 0.0_f32;
    let mut t = enter + STEP / 2.0;
    while t < exit {
        let point = origin + direction * t;
        let value = trilinear(data, &(point + half));
        let [red, green, blue, alpha] = transfer.sample(value);
        if alpha > 0.0 {
            let alpha = 1.0 - (1.0 - alpha.min(1.0)).powf(STEP as f32);
            let weight = (1.0 - opacity) * alpha;
            color[0] += weight * red;
            color[1] += weight * green;
            color[2] += weight * blue;
            opacity += weight;
            if opacity >= OPAQUE {
                break;
            }
        }
        t += STEP;
    }
    color
}

fn intersect_box(
    origin: &Vector3<f64>,
    direction: &Vector3<f64>,
    half: &Vector3<f64>,
) -> Option<(f64, f64)> {
    let mut enter = 0.0_f64;
    let mut exit = f64::INFINITY;
    for axis in 0..3 {
        if direction[axis].abs() < 1e-12 {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let a = (-half[axis] - origin[axis]) / direction[axis];
        let b = (half[axis] - origin[axis]) / direction[axis];
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
    }
    (exit > enter).then_some((enter, exit))
}

/// Samples at a position measured from the volume corner in `(x, y, spectral)`
/// voxel units; voxel centres sit at half-integer positions.
fn trilinear(data: &Array3<f32>, position: &Vector3<f64>) -> f32 {
    let (channels, height, width) = data.dim();
    let coordinate = |value: f64, len: usize| {
        let index = (value - 0.5).clamp(0.0, (len - 1) as f64);
        let lower = index.floor() as usize;
        let upper = (lower + 1).min(len - 1);
        (lower, upper, (index - lower as f64) as f32)
    };
    let (x0, x1, fx) = coordinate(position[0], width);
    let (y0, y1, fy) = coordinate(position[1], height);
    let (s0, s1, fs) = coordinate(position[2], channels);

    let lerp = |a: f32, b: f32, weight: f32| {
        if weight <= 0.0 { a } else { a * (1.0 - weight) + b * weight }
    };
    let plane = |s: usize| {
        let top = lerp(data[[s, y0, x0]], data[[s, y0, x1]], fx);
        let bottom = lerp(data[[s, y1, x0]], data[[s, y1, x1]], fx);
        lerp(top, bottom, fy)
    };
    lerp(plane(s0), plane(s1), fs)
}
