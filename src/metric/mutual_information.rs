//! Normalized mutual information between two images.
//!
//! NMI = (H(A) + H(B)) / H(A, B), estimated from a joint intensity histogram
//! with a fixed number of equal-width bins per image. Each axis spans the
//! observed range of its own image, so the metric is invariant to affine
//! intensity changes (including inversion) of either input.
//!
//! Identical non-constant images score exactly 2; statistically independent
//! images approach 1. When both images are constant every entropy is zero and
//! the ratio is NaN. That value is returned as-is: the alignment optimizers
//! treat non-finite costs as never improving.

use ndarray::ArrayView2;

use super::histogram::{entropy, JointHistogram};

/// Bins per image axis used by [`nmi`].
pub const DEFAULT_BINS: usize = 100;

/// Normalized mutual information with [`DEFAULT_BINS`] bins per axis.
///
/// Fails with `AlignError::ShapeMismatch` when the shapes differ.
pub fn nmi(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> crate::Result<f64> {
    nmi_with_bins(a, b, DEFAULT_BINS)
}

pub fn nmi_with_bins(a: &ArrayView2<f64>, b: &ArrayView2<f64>, bins: usize) -> crate::Result<f64> {
    let entropies = Entropies::of(&JointHistogram::from_images(a, b, bins)?);
    Ok(entropies.normalized_mutual_information())
}

/// Plain mutual information `H(A) + H(B) - H(A, B)` in nats.
pub fn mutual_information(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> crate::Result<f64> {
    let entropies = Entropies::of(&JointHistogram::from_images(a, b, DEFAULT_BINS)?);
    Ok(entropies.first + entropies.second - entropies.joint)
}

/// Reusable NMI scorer with a configurable bin count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmiMetric {
    bins: usize,
}

impl Default for NmiMetric {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

impl NmiMetric {
    pub fn new(bins: usize) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn evaluate(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> crate::Result<f64> {
        nmi_with_bins(a, b, self.bins)
    }
}

struct Entropies {
    first: f64,
    second: f64,
    joint: f64,
}

impl Entropies {
    fn of(hist: &JointHistogram) -> Self {
        Self {
            first: entropy(&hist.marginal_first()),
            second: entropy(&hist.marginal_second()),
            joint: hist.joint_entropy(),
        }
    }

    fn normalized_mutual_information(&self) -> f64 {
        (self.first + self.second) / self.joint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlignError;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn textured(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            let (x, y) = (c as f64, r as f64);
            (x * 0.21).sin() * (y * 0.13).cos() + 0.01 * x
        })
    }

    #[test]
    fn test_self_similarity_is_two() {
        let image = textured(40, 30);
        let score = nmi(&image.view(), &image.view()).unwrap();
        assert!((score - 2.0).abs() < 1e-12, "score = {}", score);
    }

    #[test]
    fn test_inversion_keeps_maximum() {
        let image = textured(40, 30);
        let inverted = image.mapv(|v| 1.0 - v);
        let score = nmi(&image.view(), &inverted.view()).unwrap();
        assert!((score - 2.0).abs() < 1e-9, "score = {}", score);
    }

    #[test]
    fn test_symmetry() {
        let a = textured(32, 32);
        let b = a.mapv(|v| (3.0 * v).cos());
        let ab = nmi(&a.view(), &b.view()).unwrap();
        let ba = nmi(&b.view(), &a.view()).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn test_independent_noise_scores_low() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Array2::from_shape_fn((128, 128), |_| rng.gen::<f64>());
        let b = Array2::from_shape_fn((128, 128), |_| rng.gen::<f64>());
        let score = nmi_with_bins(&a.view(), &b.view(), 16).unwrap();
        assert!(score > 1.0 && score < 1.05, "score = {}", score);
        assert!(mutual_information(&a.view(), &a.view()).unwrap() > 0.0);
    }

    #[test]
    fn test_constant_images_are_degenerate() {
        let flat = Array2::from_elem((8, 8), 0.5);
        assert!(nmi(&flat.view(), &flat.view()).unwrap().is_nan());

        // Only one constant input: H(A) = 0 and H(B) = H(A, B).
        let image = textured(8, 8);
        let score = nmi(&flat.view(), &image.view()).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = textured(10, 12);
        let b = textured(12, 10);
        let err = nmi(&a.view(), &b.view()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AlignError>(),
            Some(&AlignError::ShapeMismatch {
                expected: (10, 12),
                actual: (12, 10)
            })
        );
    }

    #[test]
    fn test_metric_bins() {
        let metric = NmiMetric::new(32);
        let image = textured(16, 16);
        assert_eq!(metric.bins(), 32);
        assert!((metric.evaluate(&image.view(), &image.view()).unwrap() - 2.0).abs() < 1e-12);
        assert!(nmi_with_bins(&image.view(), &image.view(), 0).is_err());
    }
}
