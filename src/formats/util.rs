use std::path::{Path, PathBuf};

use crate::model::finite_min_max;

use super::{IoError, Result};

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

/// Tags filesystem and encoder failures with the output path; format and
/// layout errors pass through unchanged.
pub(crate) fn at_output(path: &Path) -> impl FnOnce(IoError) -> IoError {
    let path: PathBuf = path.to_path_buf();
    move |error| match error {
        IoError::Io(_) | IoError::Image(_) | IoError::Tiff(_) => IoError::Write {
            path,
            source: Box::new(error),
        },
        other => other,
    }
}

/// Linearly scales finite samples into `0..=255`; non-finite samples map to 0.
pub(crate) fn to_u8_samples(values: &[f32]) -> Vec<u8> {
    let (min, max) = finite_min_max(values.iter().copied()).unwrap_or((0.0, 1.0));
    values
        .iter()
        .map(|value| {
            if !value.is_finite() {
                return 0;
            }
            let normalized = if (max - min).abs() < f32::EPSILON {
                0.0
            } else {
                (*value - min) / (max - min)
            };
            (normalized.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}
