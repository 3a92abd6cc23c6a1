//! Image-processing primitives consumed by the pyramid and the cost function:
//! point sampling, Gaussian blur, resize and rigid warping.

pub mod gaussian;
pub mod interpolation;
pub mod resize;
pub mod warp;

pub use gaussian::gaussian_blur;
pub use interpolation::{sample, BoundaryMode, InterpolationOrder};
pub use resize::resize;
pub use warp::warp;
