use serde::{Deserialize, Serialize};

/// Optimization variable of the aligner: rotation in radians followed by the
/// translation along columns (`x`) and rows (`y`), in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformParameters {
    pub rotation: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl TransformParameters {
    pub fn new(rotation: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            rotation,
            translate_x,
            translate_y,
        }
    }

    /// Identity parameters, the starting point at the coarsest level.
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.rotation, self.translate_x, self.translate_y]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// Reads the first three entries of an optimizer point. Missing entries
    /// are taken as zero.
    pub fn from_slice(values: &[f64]) -> Self {
        let get = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self::new(get(0), get(1), get(2))
    }

    /// Translations are measured in pixels, so moving to a level whose pixels
    /// are `factor` times smaller multiplies them by `factor`. Rotation is
    /// resolution independent.
    pub fn scale_translation(self, factor: f64) -> Self {
        Self::new(
            self.rotation,
            self.translate_x * factor,
            self.translate_y * factor,
        )
    }
}

impl From<[f64; 3]> for TransformParameters {
    fn from(values: [f64; 3]) -> Self {
        Self::from_array(values)
    }
}

/// Rotation about the origin followed by a translation, with unit scale.
///
/// Points are `(x, y) = (column, row)`. The resampler treats the transform as
/// the map from output pixel coordinates to input coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    rotation: f64,
    translation: (f64, f64),
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform {
    pub fn new(rotation: f64, translate_x: f64, translate_y: f64) -> Self {
        Self {
            rotation,
            translation: (translate_x, translate_y),
        }
    }

    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn translation_only(translate_x: f64, translate_y: f64) -> Self {
        Self::new(0.0, translate_x, translate_y)
    }

    /// Rotation by `rotation` radians that keeps `center` fixed.
    pub fn rotation_about(rotation: f64, center: (f64, f64)) -> Self {
        let (sin, cos) = rotation.sin_cos();
        let (cx, cy) = center;
        Self::new(
            rotation,
            cx - (cos * cx - sin * cy),
            cy - (sin * cx + cos * cy),
        )
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }

    pub fn translation(&self) -> (f64, f64) {
        self.translation
    }

    pub fn params(&self) -> TransformParameters {
        TransformParameters::new(self.rotation, self.translation.0, self.translation.1)
    }

    /// Homogeneous 3x3 matrix acting on `(x, y, 1)`.
    pub fn matrix(&self) -> [[f64; 3]; 3] {
        let (sin, cos) = self.rotation.sin_cos();
        [
            [cos, -sin, self.translation.0],
            [sin, cos, self.translation.1],
            [0.0, 0.0, 1.0],
        ]
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation.sin_cos();
        (
            cos * x - sin * y + self.translation.0,
            sin * x + cos * y + self.translation.1,
        )
    }

    pub fn inverse(&self) -> Self {
        let (sin, cos) = self.rotation.sin_cos();
        let (tx, ty) = self.translation;
        Self::new(-self.rotation, -(cos * tx + sin * ty), sin * tx - cos * ty)
    }

    /// `self ∘ other`: applies `other` first, then `self`.
    pub fn compose(&self, other: &RigidTransform) -> Self {
        let (tx, ty) = self.apply(other.translation.0, other.translation.1);
        Self::new(self.rotation + other.rotation, tx, ty)
    }
}

impl From<TransformParameters> for RigidTransform {
    fn from(params: TransformParameters) -> Self {
        make_transform(&params)
    }
}

/// Materializes optimizer parameters as a transform usable by the resampler.
pub fn make_transform(params: &TransformParameters) -> RigidTransform {
    RigidTransform::new(params.rotation, params.translate_x, params.translate_y)
}
