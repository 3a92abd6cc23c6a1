//! Separable Gaussian smoothing.

use ndarray::{Array2, ArrayView2, Zip};

use super::interpolation::{boundary_index, BoundaryMode};

/// Kernel support in standard deviations on each side of the centre.
pub const TRUNCATE: f64 = 4.0;

/// Normalized 1D Gaussian taps, `2 * radius + 1` long with
/// `radius = round(TRUNCATE * sigma)`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= sum);
    taps
}

/// Blurs `image` with an isotropic Gaussian of standard deviation `sigma`,
/// reflecting at the borders. A non-positive `sigma` returns a copy.
pub fn gaussian_blur(image: &ArrayView2<f64>, sigma: f64) -> Array2<f64> {
    if !(sigma > 0.0) || image.is_empty() {
        return image.to_owned();
    }

    let kernel = gaussian_kernel(sigma);
    let horizontal = convolve_axis(image, &kernel, true);
    convolve_axis(&horizontal.view(), &kernel, false)
}

fn convolve_axis(image: &ArrayView2<f64>, kernel: &[f64], along_columns: bool) -> Array2<f64> {
    let (rows, cols) = image.dim();
    let radius = (kernel.len() / 2) as isize;
    let mut output = Array2::<f64>::zeros((rows, cols));

    Zip::indexed(&mut output).par_for_each(|(r, c), value| {
        let mut acc = 0.0;
        for (k, weight) in kernel.iter().enumerate() {
            let offset = k as isize - radius;
            acc += weight
                * if along_columns {
                    image[[r, boundary_index(c as isize + offset, cols, BoundaryMode::Reflect)]]
                } else {
                    image[[boundary_index(r as isize + offset, rows, BoundaryMode::Reflect), c]]
                };
        }
        *value = acc;
    });

    output
}
