use std::path::Path;

use crate::model::Cube;

use super::Result;
use super::fits::{FITS_EXTENSIONS, read_fits, write_fits};
use super::util::at_output;

pub trait CubeReader: Send + Sync {
    fn supports_extension(&self, extension: &str) -> bool;
    fn read(&self, path: &Path) -> Result<Cube>;
}

pub trait CubeWriter: Send + Sync {
    fn supports_extension(&self, extension: &str) -> bool;
    fn write(&self, path: &Path, cube: &Cube) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FitsCodec;

impl CubeReader for FitsCodec {
    fn supports_extension(&self, extension: &str) -> bool {
        FITS_EXTENSIONS.contains(&extension)
    }

    fn read(&self, path: &Path) -> Result<Cube> {
        read_fits(path)
    }
}

impl CubeWriter for FitsCodec {
    fn supports_extension(&self, extension: &str) -> bool {
        FITS_EXTENSIONS.contains(&extension)
    }

    fn write(&self, path: &Path, cube: &Cube) -> Result<()> {
        write_fits(path, cube).map_err(at_output(path))
    }
}
