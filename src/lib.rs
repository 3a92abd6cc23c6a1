//! Rigid 2D image registration by normalized mutual information.
//!
//! The target image is aligned onto the reference by optimizing a rotation and
//! a translation coarse-to-fine over Gaussian pyramids: basin-hopping on the
//! coarse levels, Powell's method once the search is close.

pub mod analysis;
pub mod config;
pub mod cost;
pub mod data;
pub mod error;
pub mod filters;
pub mod logging;
pub mod metric;
pub mod optimizer;
pub mod pyramid;
pub mod registration;
pub mod transform;
pub mod visualization;

pub use analysis::*;
pub use cost::{cost_nmi, NmiCost};
pub use data::*;
pub use error::AlignError;
pub use filters::{gaussian_blur, resize, warp, BoundaryMode, InterpolationOrder};
pub use metric::{mutual_information, nmi, nmi_with_bins, NmiMetric};
pub use optimizer::{BasinHopping, BasinHoppingConfig, Objective, OptimizeResult, Powell, PowellConfig};
pub use pyramid::{build_pyramid, Pyramid, PyramidConfig};
pub use registration::{align, Aligner, AlignmentConfig, AlignmentReport, LevelReport, Strategy};
pub use transform::{make_transform, RigidTransform, TransformParameters};

/// Grayscale image, indexed `[row, col]`.
pub type Image = ndarray::Array2<f64>;

pub type Result<T> = anyhow::Result<T>;
