//! Joint intensity histograms and Shannon entropy.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::AlignError;

/// Equal-width binning over an observed value range.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Binning {
    min: f64,
    width: f64,
    bins: usize,
}

impl Binning {
    /// Covers `[min, max]` of `values`. A constant input gets the range
    /// `[v - 0.5, v + 0.5]` so every sample lands in the middle bin.
    fn observed<'a>(values: impl Iterator<Item = &'a f64>, bins: usize) -> Self {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }
        if !(min < max) {
            let centre = if min.is_finite() { min } else { 0.0 };
            min = centre - 0.5;
            max = centre + 0.5;
        }
        Self {
            min,
            width: (max - min) / bins as f64,
            bins,
        }
    }

    /// The maximum value falls in the last bin.
    #[inline]
    fn index(&self, value: f64) -> usize {
        let i = ((value - self.min) / self.width).floor();
        if i <= 0.0 {
            0
        } else {
            (i as usize).min(self.bins - 1)
        }
    }
}

/// Joint probability mass of two equally shaped images, `bins x bins`,
/// rows indexed by the first image's bin.
#[derive(Debug, Clone)]
pub struct JointHistogram {
    pmf: Array2<f64>,
}

impl JointHistogram {
    pub fn from_images(
        a: &ArrayView2<f64>,
        b: &ArrayView2<f64>,
        bins: usize,
    ) -> Result<Self, AlignError> {
        AlignError::check_shapes(a.dim(), b.dim())?;
        if bins == 0 {
            return Err(AlignError::invalid_parameter("histogram needs at least one bin"));
        }
        if a.is_empty() {
            return Err(AlignError::EmptyImage);
        }

        let binning_a = Binning::observed(a.iter(), bins);
        let binning_b = Binning::observed(b.iter(), bins);

        let mut counts = Array2::<f64>::zeros((bins, bins));
        for (&va, &vb) in a.iter().zip(b.iter()) {
            counts[[binning_a.index(va), binning_b.index(vb)]] += 1.0;
        }
        counts /= a.len() as f64;

        Ok(Self { pmf: counts })
    }

    pub fn bins(&self) -> usize {
        self.pmf.nrows()
    }

    pub fn pmf(&self) -> &Array2<f64> {
        &self.pmf
    }

    /// Marginal distribution of the first image.
    pub fn marginal_first(&self) -> Array1<f64> {
        self.pmf.sum_axis(Axis(1))
    }

    /// Marginal distribution of the second image.
    pub fn marginal_second(&self) -> Array1<f64> {
        self.pmf.sum_axis(Axis(0))
    }

    pub fn joint_entropy(&self) -> f64 {
        entropy(self.pmf.iter())
    }
}

/// Shannon entropy in nats of a probability mass, with `0 ln 0 = 0`.
pub fn entropy<'a>(pmf: impl IntoIterator<Item = &'a f64>) -> f64 {
    -pmf
        .into_iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.ln())
        .sum::<f64>()
}
