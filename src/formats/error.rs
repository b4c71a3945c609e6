use std::path::PathBuf;

use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported data layout: {0}")]
    UnsupportedLayout(String),

    #[error("missing required FITS keyword `{0}`")]
    MissingKeyword(String),

    #[error("invalid FITS header: {0}")]
    InvalidHeader(String),

    #[error("unsupported BITPIX: {0}")]
    UnsupportedBitpix(i64),

    #[error("no spectral axis found among the first three axes (checked CTYPE1..3)")]
    MissingSpectralAxis,

    #[error("file is truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<IoError>,
    },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF encode failure: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("core cube/metadata failure: {0}")]
    Core(#[from] CoreError),
}
