use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::filters::{warp, InterpolationOrder};
use crate::metric::nmi;
use crate::transform::RigidTransform;

/// Absolute rotation difference in degrees, wrapped to `[0, 180]`.
pub fn calculate_rotation_error(estimated: &RigidTransform, expected: &RigidTransform) -> f64 {
    let diff = (estimated.rotation_degrees() - expected.rotation_degrees()).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Distance in pixels between where the two transforms send `probe`.
pub fn calculate_translation_error(
    estimated: &RigidTransform,
    expected: &RigidTransform,
    probe: (f64, f64),
) -> f64 {
    let (ex, ey) = estimated.apply(probe.0, probe.1);
    let (gx, gy) = expected.apply(probe.0, probe.1);
    ((ex - gx).powi(2) + (ey - gy).powi(2)).sqrt()
}

/// Image centre `((cols-1)/2, (rows-1)/2)` in `(x, y)` coordinates.
pub fn image_center(shape: (usize, usize)) -> (f64, f64) {
    ((shape.1 as f64 - 1.0) / 2.0, (shape.0 as f64 - 1.0) / 2.0)
}

/// Accuracy of an estimate against a known correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub rotation_error_degrees: f64,
    /// Error measured at the image centre.
    pub translation_error_pixels: f64,
    pub nmi_before: f64,
    pub nmi_after: f64,
}

impl AccuracyReport {
    pub fn is_within(&self, rotation_degrees: f64, translation_pixels: f64) -> bool {
        self.rotation_error_degrees <= rotation_degrees
            && self.translation_error_pixels <= translation_pixels
    }
}

pub fn evaluate_alignment(
    reference: &ArrayView2<f64>,
    target: &ArrayView2<f64>,
    estimated: &RigidTransform,
    expected: &RigidTransform,
) -> crate::Result<AccuracyReport> {
    let registered = warp(target, estimated, InterpolationOrder::Cubic);
    Ok(AccuracyReport {
        rotation_error_degrees: calculate_rotation_error(estimated, expected),
        translation_error_pixels: calculate_translation_error(
            estimated,
            expected,
            image_center(reference.dim()),
        ),
        nmi_before: nmi(reference, target)?,
        nmi_after: nmi(reference, &registered.view())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_error_wraps() {
        let a = RigidTransform::new(179f64.to_radians(), 0.0, 0.0);
        let b = RigidTransform::new((-179f64).to_radians(), 0.0, 0.0);
        assert!((calculate_rotation_error(&a, &b) - 2.0).abs() < 1e-9);
        assert!(calculate_rotation_error(&a, &a) < 1e-12);
    }

    #[test]
    fn test_translation_error_at_probe() {
        let a = RigidTransform::translation_only(3.0, 4.0);
        let b = RigidTransform::identity();
        assert!((calculate_translation_error(&a, &b, (10.0, 10.0)) - 5.0).abs() < 1e-12);

    }

    #[test]
    fn test_translation_error_depends_on_rotation_centre() {
        let centre = image_center((11, 11));
        let about_centre = RigidTransform::rotation_about(0.3, centre);
        let about_origin = RigidTransform::rotation_about(0.3, (0.0, 0.0));
        let fixed = about_centre.apply(centre.0, centre.1);
        assert!((fixed.0 - centre.0).abs() < 1e-12 && (fixed.1 - centre.1).abs() < 1e-12);

        // Each keeps its own centre fixed and moves the other by 2|c|sin(θ/2).
        let expected = 2.0 * 50f64.sqrt() * 0.15f64.sin();
        let at_centre = calculate_translation_error(&about_centre, &about_origin, centre);
        let at_origin = calculate_translation_error(&about_centre, &about_origin, (0.0, 0.0));
        assert!((at_centre - expected).abs() < 1e-9, "{}", at_centre);
        assert!((at_origin - expected).abs() < 1e-9, "{}", at_origin);
        assert!(calculate_translation_error(&about_centre, &about_centre, (3.0, 7.0)) < 1e-12);
    }

    #[test]
    fn test_image_center() {
        assert_eq!(image_center((5, 9)), (4.0, 2.0));
    }

    #[test]
    fn test_accuracy_report_thresholds() {
        let report = AccuracyReport {
            rotation_error_degrees: 0.4,
            translation_error_pixels: 1.5,
            nmi_before: 1.1,
            nmi_after: 1.6,
        };
        assert!(report.is_within(0.5, 2.0));
        assert!(!report.is_within(0.1, 2.0));
    }
}
