//! Point sampling of 2D images at fractional coordinates.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Spline-order style selector for the interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationOrder {
    /// Order 0.
    Nearest,
    /// Order 1, bilinear.
    Linear,
    /// Order 3, Keys cubic convolution (a = -0.5) on a 4x4 neighbourhood.
    Cubic,
}

impl InterpolationOrder {
    pub fn order(self) -> usize {
        match self {
            Self::Nearest => 0,
            Self::Linear => 1,
            Self::Cubic => 3,
        }
    }

    pub fn from_order(order: usize) -> Result<Self, AlignError> {
        match order {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Linear),
            3 => Ok(Self::Cubic),
            other => Err(AlignError::invalid_parameter(format!(
                "unsupported interpolation order {} (expected 0, 1 or 3)",
                other
            ))),
        }
    }
}

/// How samples outside the image are produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Points outside `[0, len-1]` on either axis read as the constant value.
    Constant(f64),
    /// Half-sample symmetric extension: `d c b a | a b c d | d c b a`.
    Reflect,
    /// Repeat the edge pixel.
    Edge,
}

impl Default for BoundaryMode {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

/// Maps a possibly out-of-range tap index into `[0, len)`.
#[inline]
pub fn boundary_index(index: isize, len: usize, mode: BoundaryMode) -> usize {
    let n = len as isize;
    match mode {
        BoundaryMode::Reflect => {
            if n == 1 {
                return 0;
            }
            let period = 2 * n;
            let mut i = index.rem_euclid(period);
            if i >= n {
                i = period - 1 - i;
            }
            i as usize
        }
        // Constant-mode callers reject far points before tapping, so only
        // the kernel support near the edge reaches here.
        BoundaryMode::Constant(_) | BoundaryMode::Edge => index.clamp(0, n - 1) as usize,
    }
}

/// Keys cubic convolution weights for taps at offsets -1, 0, 1, 2.
#[inline]
fn cubic_weights(t: f64) -> [f64; 4] {
    const A: f64 = -0.5;
    let near = |x: f64| ((A + 2.0) * x - (A + 3.0)) * x * x + 1.0;
    let far = |x: f64| ((A * x - 5.0 * A) * x + 8.0 * A) * x - 4.0 * A;
    [far(1.0 + t), near(t), near(1.0 - t), far(2.0 - t)]
}

/// Samples `image` at (`row`, `col`).
pub fn sample(
    image: &ArrayView2<f64>,
    row: f64,
    col: f64,
    order: InterpolationOrder,
    mode: BoundaryMode,
) -> f64 {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }

    if let BoundaryMode::Constant(cval) = mode {
        const EDGE_EPS: f64 = 1e-9;
        if !row.is_finite()
            || !col.is_finite()
            || row < -EDGE_EPS
            || col < -EDGE_EPS
            || row > (rows - 1) as f64 + EDGE_EPS
            || col > (cols - 1) as f64 + EDGE_EPS
        {
            return cval;
        }
    }

    let at = |r: isize, c: isize| -> f64 {
        image[[boundary_index(r, rows, mode), boundary_index(c, cols, mode)]]
    };

    match order {
        InterpolationOrder::Nearest => at(row.round() as isize, col.round() as isize),
        InterpolationOrder::Linear => {
            let r0 = row.floor();
            let c0 = col.floor();
            let fr = row - r0;
            let fc = col - c0;
            let (r0, c0) = (r0 as isize, c0 as isize);

            let top = at(r0, c0) * (1.0 - fc) + at(r0, c0 + 1) * fc;
            let bottom = at(r0 + 1, c0) * (1.0 - fc) + at(r0 + 1, c0 + 1) * fc;
            top * (1.0 - fr) + bottom * fr
        }
        InterpolationOrder::Cubic => {
            let r0 = row.floor();
            let c0 = col.floor();
            let wr = cubic_weights(row - r0);
            let wc = cubic_weights(col - c0);
            let (r0, c0) = (r0 as isize, c0 as isize);

            let mut value = 0.0;
            for (i, weight_r) in wr.iter().enumerate() {
                let r = r0 + i as isize - 1;
                let mut line = 0.0;
                for (j, weight_c) in wc.iter().enumerate() {
                    line += weight_c * at(r, c0 + j as isize - 1);
                }
                value += weight_r * line;
            }
            value
        }
    }
}
