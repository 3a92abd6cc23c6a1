//! Resampling an image onto a grid of a different shape.

use ndarray::{Array2, ArrayView2, Zip};

use super::interpolation::{sample, BoundaryMode, InterpolationOrder};
use crate::error::AlignError;

/// Resizes `image` to `shape = (rows, cols)` by pixel-centre mapping:
/// `src = (dst + 0.5) * in_len / out_len - 0.5` on each axis.
///
/// No anti-aliasing is applied; callers that shrink should blur first.
pub fn resize(
    image: &ArrayView2<f64>,
    shape: (usize, usize),
    order: InterpolationOrder,
    mode: BoundaryMode,
) -> crate::Result<Array2<f64>> {
    let (rows, cols) = image.dim();
    if rows == 0 || cols == 0 {
        return Err(AlignError::EmptyImage.into());
    }
    if shape.0 == 0 || shape.1 == 0 {
        return Err(AlignError::invalid_parameter(format!(
            "resize target shape {:?} has an empty axis",
            shape
        ))
        .into());
    }
    if shape == (rows, cols) {
        return Ok(image.to_owned());
    }

    let scale_r = rows as f64 / shape.0 as f64;
    let scale_c = cols as f64 / shape.1 as f64;
    let mut output = Array2::<f64>::zeros(shape);

    Zip::indexed(&mut output).par_for_each(|(r, c), value| {
        let src_r = (r as f64 + 0.5) * scale_r - 0.5;
        let src_c = (c as f64 + 0.5) * scale_c - 0.5;
        *value = sample(image, src_r, src_c, order, mode);
    });

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape() {
        let image = Array2::from_elem((10, 7), 1.0);
        let out = resize(&image.view(), (5, 4), InterpolationOrder::Linear, BoundaryMode::Reflect)
            .unwrap();
        assert_eq!(out.dim(), (5, 4));
        assert!(out.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_halving_averages_pixel_pairs() {
        let image = Array2::from_shape_fn((4, 4), |(_, c)| c as f64);
        let out = resize(&image.view(), (2, 2), InterpolationOrder::Linear, BoundaryMode::Reflect)
            .unwrap();
        // Output centre 0 maps to input 0.5, centre 1 to input 2.5.
        assert!((out[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((out[[1, 1]] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_empty_target() {
        let image = Array2::from_elem((4, 4), 1.0);
        let err = resize(&image.view(), (0, 2), InterpolationOrder::Linear, BoundaryMode::Reflect)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AlignError>(),
            Some(AlignError::InvalidParameter(_))
        ));
    }
}
