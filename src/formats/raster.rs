use std::path::Path;

use image::{ImageBuffer, Luma, Rgb};

use crate::model::Projection;

use super::util::to_u8_samples;
use super::{IoError, Result};

/// Writes an 8-bit quick-look of a projection, north up: row 0 of the
/// projection ends up at the bottom of the image.
pub(crate) fn write_projection_png(path: &Path, projection: &Projection) -> Result<()> {
    let [height, width] = projection.shape();
    let values = (0..height)
        .rev()
        .flat_map(|y| projection.data.row(y).to_vec())
        .collect::<Vec<_>>();
    let bytes = to_u8_samples(&values);
    let image = ImageBuffer::<Luma<u8>, _>::from_vec(width as u32, height as u32, bytes)
        .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
    image.save(path)?;
    Ok(())
}

pub(crate) fn write_rgb(path: &Path, width: usize, height: usize, pixels: Vec<u8>) -> Result<()> {
    if pixels.len() != width * height * 3 {
        return Err(IoError::UnsupportedLayout(format!(
            "RGB image of {width}x{height} needs {} bytes, found {}",
            width * height * 3,
            pixels.len()
        )));
    }
    let image = ImageBuffer::<Rgb<u8>, _>::from_vec(width as u32, height as u32, pixels)
        .ok_or_else(|| IoError::UnsupportedLayout("failed to construct RGB image".into()))?;
    image.save(path)?;
    Ok(())
}
