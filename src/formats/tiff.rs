use std::fs::File;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

use crate::model::Projection;

use super::Result;

/// Writes the projection as a single 32-bit float page in array row order.
pub(crate) fn write_projection_tiff(path: &Path, projection: &Projection) -> Result<()> {
    let [height, width] = projection.shape();
    let page = projection
        .data
        .as_standard_layout()
        .iter()
        .copied()
        .collect::<Vec<_>>();
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;
    let image = encoder.new_image::<colortype::Gray32Float>(width as u32, height as u32)?;
    image.write_data(&page)?;
    Ok(())
}
