use thiserror::Error;

use super::AxisKind;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(
        "metadata dimensionality mismatch: data has {data_ndim} dimensions but metadata has {meta_ndim}"
    )]
    DimensionalityMismatch { data_ndim: usize, meta_ndim: usize },

    #[error(
        "dimension size mismatch at axis {axis}: data size {data_size} != metadata size {meta_size}"
    )]
    DimensionSizeMismatch {
        axis: usize,
        data_size: usize,
        meta_size: usize,
    },

    #[error("invalid dimension size 0 at axis {axis}")]
    ZeroSizedDimension { axis: usize },

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("{axis} range {start}:{end} is out of bounds for axis length {len}")]
    AxisOutOfBounds {
        axis: AxisKind,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("{axis} range {start}:{end} is empty")]
    EmptyRange {
        axis: AxisKind,
        start: usize,
        end: usize,
    },

    #[error("invalid axis range: {0}")]
    InvalidRange(String),

    #[error("mask shape {found:?} is not compatible with cube shape {expected:?}")]
    MaskShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("statistic `{statistic}` is undefined: the mask selects no finite voxels")]
    EmptySelection { statistic: &'static str },
}
