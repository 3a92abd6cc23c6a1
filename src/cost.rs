//! Registration cost: negative NMI between the reference and the warped target.

use ndarray::ArrayView2;

use crate::error::AlignError;
use crate::filters::{warp, InterpolationOrder};
use crate::metric::{nmi_with_bins, DEFAULT_BINS};
use crate::optimizer::Objective;
use crate::transform::{make_transform, TransformParameters};

/// Cost of `params` for one image pair. Lower is better; perfect alignment of
/// non-constant images reaches -2.
pub fn cost_nmi(
    params: &TransformParameters,
    reference: &ArrayView2<f64>,
    target: &ArrayView2<f64>,
) -> crate::Result<f64> {
    AlignError::check_shapes(reference.dim(), target.dim())?;
    let warped = warp(target, &make_transform(params), InterpolationOrder::Cubic);
    Ok(-nmi_with_bins(reference, &warped.view(), DEFAULT_BINS)?)
}

/// [`cost_nmi`] bound to one image pair, usable as an optimizer objective.
#[derive(Debug, Clone)]
pub struct NmiCost<'a> {
    reference: ArrayView2<'a, f64>,
    target: ArrayView2<'a, f64>,
    order: InterpolationOrder,
    bins: usize,
}

impl<'a> NmiCost<'a> {
    pub fn new(reference: ArrayView2<'a, f64>, target: ArrayView2<'a, f64>) -> crate::Result<Self> {
        AlignError::check_shapes(reference.dim(), target.dim())?;
        Ok(Self {
            reference,
            target,
            order: InterpolationOrder::Cubic,
            bins: DEFAULT_BINS,
        })
    }

    pub fn with_interpolation(mut self, order: InterpolationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_bins(mut self, bins: usize) -> crate::Result<Self> {
        if bins == 0 {
            return Err(AlignError::invalid_parameter("histogram bins must be at least 1").into());
        }
        self.bins = bins;
        Ok(self)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.reference.dim()
    }

    pub fn cost(&self, params: &TransformParameters) -> f64 {
        let warped = warp(&self.target, &make_transform(params), self.order);
        // Shapes and bins were checked on construction.
        nmi_with_bins(&self.reference, &warped.view(), self.bins)
            .map(|score| -score)
            .unwrap_or(f64::NAN)
    }
}

impl Objective for NmiCost<'_> {
    fn evaluate(&self, x: &[f64]) -> f64 {
        self.cost(&TransformParameters::from_slice(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn blob(rows: usize, cols: usize, cy: f64, cx: f64) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            let (dy, dx) = (r as f64 - cy, c as f64 - cx);
            (-(dx * dx + dy * dy) / 40.0).exp() + 0.002 * (r * cols + c) as f64 / (rows * cols) as f64
        })
    }

    #[test]
    fn test_identity_cost_of_same_image() {
        let image = blob(24, 24, 12.0, 10.0);
        let cost = cost_nmi(&TransformParameters::zeros(), &image.view(), &image.view()).unwrap();
        assert!((cost + 2.0).abs() < 1e-9, "cost = {}", cost);
    }

    #[test]
    fn test_correct_shift_scores_better() {
        let reference = blob(32, 32, 16.0, 16.0);
        let target = blob(32, 32, 16.0, 19.0);
        let objective = NmiCost::new(reference.view(), target.view()).unwrap();
        // Output (r, c) reads the target at (r, c + 3).
        let aligned = objective.evaluate(&[0.0, 3.0, 0.0]);
        let identity = objective.evaluate(&[0.0, 0.0, 0.0]);
        assert!(aligned < identity, "{} !< {}", aligned, identity);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = blob(10, 12, 5.0, 5.0);
        let b = blob(12, 10, 5.0, 5.0);
        assert!(cost_nmi(&TransformParameters::zeros(), &a.view(), &b.view()).is_err());
        assert!(NmiCost::new(a.view(), b.view()).is_err());
    }

    #[test]
    fn test_constant_pair_is_nan() {
        let flat = Array2::from_elem((8, 8), 0.25);
        let objective = NmiCost::new(flat.view(), flat.view()).unwrap();
        // Zero fill from the shift breaks the constant target, so only the
        // identity stays fully degenerate.
        assert!(objective.evaluate(&[0.0, 0.0, 0.0]).is_nan());
        assert!(objective.clone().with_bins(0).is_err());
    }
}
