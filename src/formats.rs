mod api;
mod codec;
mod error;
mod fits;
mod raster;
mod tiff;
mod util;

#[cfg(test)]
mod tests;

pub use api::{read_cube, supported_formats, write_cube, write_projection, write_rgb_image};
pub use codec::{CubeReader, CubeWriter, FitsCodec};
pub use error::{IoError, Result};
