use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::filters::{warp, InterpolationOrder};
use crate::transform::RigidTransform;
use crate::Image;

pub struct ImageTransformer;

impl ImageTransformer {
    /// Rotate an image counter-clockwise by `angle_degrees` about its centre.
    /// Bilinear sampling, zero fill.
    pub fn rotate(image: &ArrayView2<f64>, angle_degrees: f64) -> Image {
        warp(
            image,
            &Self::rotation_map(image.dim(), angle_degrees),
            InterpolationOrder::Linear,
        )
    }

    /// Shift an image content by `rows` down and `cols` right.
    /// Cubic sampling, zero fill.
    pub fn shift(image: &ArrayView2<f64>, rows: f64, cols: f64) -> Image {
        warp(
            image,
            &Self::shift_map(rows, cols),
            InterpolationOrder::Cubic,
        )
    }

    /// Apply rotation and shift together
    pub fn rotate_and_shift(image: &ArrayView2<f64>, angle_degrees: f64, rows: f64, cols: f64) -> Image {
        let rotated = Self::rotate(image, angle_degrees);
        Self::shift(&rotated.view(), rows, cols)
    }

    /// Intensity inversion `1 - v` for images in `[0, 1]`.
    pub fn invert(image: &ArrayView2<f64>) -> Image {
        image.mapv(|v| 1.0 - v)
    }

    fn rotation_map(shape: (usize, usize), angle_degrees: f64) -> RigidTransform {
        let (rows, cols) = shape;
        let center = ((cols as f64 - 1.0) / 2.0, (rows as f64 - 1.0) / 2.0);
        RigidTransform::rotation_about(angle_degrees.to_radians(), center)
    }

    fn shift_map(rows: f64, cols: f64) -> RigidTransform {
        RigidTransform::translation_only(-cols, -rows)
    }
}

/// Known distortion applied to build a test pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruth {
    pub rotation_degrees: f64,
    pub shift_rows: f64,
    pub shift_cols: f64,
    pub invert: bool,
}

impl Default for GroundTruth {
    fn default() -> Self {
        Self::new()
    }
}

impl GroundTruth {
    pub fn new() -> Self {
        Self {
            rotation_degrees: 0.0,
            shift_rows: 0.0,
            shift_cols: 0.0,
            invert: false,
        }
    }

    pub fn rotation(angle: f64) -> Self {
        Self {
            rotation_degrees: angle,
            ..Self::new()
        }
    }

    pub fn shift(rows: f64, cols: f64) -> Self {
        Self {
            shift_rows: rows,
            shift_cols: cols,
            ..Self::new()
        }
    }

    /// 13° rotation, shift of 50 rows up and 10 columns right, inverted.
    pub fn reference_scenario() -> Self {
        Self {
            rotation_degrees: 13.0,
            shift_rows: -50.0,
            shift_cols: 10.0,
            invert: true,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Rotates, then shifts, then optionally inverts `image`.
    pub fn apply(&self, image: &ArrayView2<f64>) -> Image {
        let mut altered = if self.rotation_degrees != 0.0 {
            ImageTransformer::rotate(image, self.rotation_degrees)
        } else {
            image.to_owned()
        };
        if self.shift_rows != 0.0 || self.shift_cols != 0.0 {
            altered = ImageTransformer::shift(&altered.view(), self.shift_rows, self.shift_cols);
        }
        if self.invert {
            altered = ImageTransformer::invert(&altered.view());
        }
        altered
    }

    /// Coordinate map of the whole distortion: the altered image at `p` holds
    /// the original at `distortion_map(shape).apply(p)`.
    pub fn distortion_map(&self, shape: (usize, usize)) -> RigidTransform {
        ImageTransformer::rotation_map(shape, self.rotation_degrees)
            .compose(&ImageTransformer::shift_map(self.shift_rows, self.shift_cols))
    }

    /// Transform an aligner should return for the pair `(original, altered)`.
    pub fn expected_correction(&self, shape: (usize, usize)) -> RigidTransform {
        self.distortion_map(shape).inverse()
    }
}
