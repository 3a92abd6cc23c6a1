//! Exhaustive cost sampling over a parameter grid, for inspecting the
//! registration landscape and seeding experiments.

use ndarray::ArrayView2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cost::NmiCost;
use crate::transform::TransformParameters;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandscapeSample {
    pub params: TransformParameters,
    pub cost: f64,
}

/// Cost at every parameter set, evaluated in parallel. Order is preserved.
pub fn sample_landscape(
    reference: &ArrayView2<f64>,
    target: &ArrayView2<f64>,
    grid: &[TransformParameters],
) -> crate::Result<Vec<LandscapeSample>> {
    let cost = NmiCost::new(reference.view(), target.view())?;
    Ok(grid
        .par_iter()
        .map(|params| LandscapeSample {
            params: *params,
            cost: cost.cost(params),
        })
        .collect())
}

/// Cost of pure rotations about the origin, angles in degrees.
pub fn rotation_profile(
    reference: &ArrayView2<f64>,
    target: &ArrayView2<f64>,
    angles_degrees: &[f64],
) -> crate::Result<Vec<LandscapeSample>> {
    let grid: Vec<TransformParameters> = angles_degrees
        .iter()
        .map(|angle| TransformParameters::new(angle.to_radians(), 0.0, 0.0))
        .collect();
    sample_landscape(reference, target, &grid)
}

/// Integer translation grid `[-radius, radius]^2` at a fixed rotation.
pub fn translation_grid(rotation: f64, radius: i32) -> Vec<TransformParameters> {
    (-radius..=radius)
        .flat_map(|ty| {
            (-radius..=radius)
                .map(move |tx| TransformParameters::new(rotation, tx as f64, ty as f64))
        })
        .collect()
}

/// Lowest finite sample.
pub fn best_sample(samples: &[LandscapeSample]) -> Option<LandscapeSample> {
    samples
        .iter()
        .filter(|s| s.cost.is_finite())
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .copied()
}
