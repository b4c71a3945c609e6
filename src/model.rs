mod axis;
mod cube;
mod error;
mod mask;
mod metadata;
mod quantity;
mod wcs;


pub use axis::{AxisKind, AxisRange, CUBE_AXES, PixelType};
pub use cube::{Cube, Projection};
pub(crate) use cube::finite_min_max;
pub use error::{CoreError, Result};
pub use mask::{Mask, MaskedCube};
pub use metadata::{CubeMetadata, Dim};
pub use quantity::Quantity;
pub use wcs::{AxisWcs, SPECTRAL_CTYPES};
