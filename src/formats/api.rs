use std::path::Path;

use crate::model::{Cube, Projection};

use super::codec::{CubeReader, CubeWriter, FitsCodec};
use super::fits::FITS_EXTENSIONS;
use super::raster::{write_projection_png, write_rgb};
use super::tiff::write_projection_tiff;
use super::util::{at_output, extension};
use super::{IoError, Result};

pub fn read_cube(path: impl AsRef<Path>) -> Result<Cube> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if CubeReader::supports_extension(&FitsCodec, &extension) {
        FitsCodec.read(path)
    } else {
        Err(IoError::UnsupportedFormat(extension))
    }
}

pub fn write_cube(path: impl AsRef<Path>, cube: &Cube) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if CubeWriter::supports_extension(&FitsCodec, &extension) {
        FitsCodec.write(path, cube)
    } else {
        Err(IoError::UnsupportedFormat(extension))
    }
}

pub fn write_projection(path: impl AsRef<Path>, projection: &Projection) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    match extension.as_str() {
        "png" => write_projection_png(path, projection).map_err(at_output(path)),
        "tif" | "tiff" => write_projection_tiff(path, projection).map_err(at_output(path)),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn write_rgb_image(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    pixels: Vec<u8>,
) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    match extension.as_str() {
        "png" | "jpg" | "jpeg" => write_rgb(path, width, height, pixels).map_err(at_output(path)),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn supported_formats() -> &'static [&'static str] {
    FITS_EXTENSIONS
}
