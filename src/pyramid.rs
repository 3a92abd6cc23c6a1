//! Gaussian image pyramids for coarse-to-fine search.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::error::AlignError;
use crate::filters::{gaussian_blur, resize, BoundaryMode, InterpolationOrder};
use crate::Image;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    /// Upper bound on the number of downscaling steps.
    pub max_layers: usize,
    /// Linear size ratio between consecutive levels.
    pub downscale: f64,
    /// Blur applied before each downscale. `None` uses `2 * downscale / 6`.
    pub sigma: Option<f64>,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            max_layers: 4,
            downscale: 2.0,
            sigma: None,
        }
    }
}

impl PyramidConfig {
    pub fn new(max_layers: usize, downscale: f64) -> Self {
        Self {
            max_layers,
            downscale,
            sigma: None,
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn smoothing_sigma(&self) -> f64 {
        self.sigma.unwrap_or(2.0 * self.downscale / 6.0)
    }

    pub fn validate(&self) -> Result<(), AlignError> {
        if !(self.downscale > 1.0) || !self.downscale.is_finite() {
            return Err(AlignError::invalid_parameter(format!(
                "pyramid downscale must be a finite value > 1, got {}",
                self.downscale
            )));
        }
        if let Some(sigma) = self.sigma {
            if !(sigma >= 0.0) {
                return Err(AlignError::invalid_parameter(format!(
                    "pyramid sigma must be non-negative, got {}",
                    sigma
                )));
            }
        }
        Ok(())
    }
}

/// Shape of the next coarser level: each axis divided by `downscale`,
/// rounded half to even, never below one pixel.
pub fn downscaled_shape(shape: (usize, usize), downscale: f64) -> (usize, usize) {
    let shrink = |d: usize| ((d as f64 / downscale).round_ties_even() as usize).max(1);
    (shrink(shape.0), shrink(shape.1))
}

/// Levels ordered from coarsest to finest; the last level is the original.
#[derive(Debug, Clone)]
pub struct Pyramid {
    levels: Vec<Image>,
}

impl Pyramid {
    /// Blurs and downsamples `image` up to `config.max_layers` times, stopping
    /// early once a step would leave the shape unchanged.
    pub fn build(image: &ArrayView2<f64>, config: &PyramidConfig) -> crate::Result<Self> {
        config.validate()?;
        if image.is_empty() {
            return Err(AlignError::EmptyImage.into());
        }

        let sigma = config.smoothing_sigma();
        let mut levels = vec![image.to_owned()];
        for _ in 0..config.max_layers {
            let current = levels.last().map(|level| level.view()).ok_or(AlignError::EmptyImage)?;
            let shape = downscaled_shape(current.dim(), config.downscale);
            if shape == current.dim() {
                break;
            }
            let blurred = gaussian_blur(&current, sigma);
            let smaller = resize(
                &blurred.view(),
                shape,
                InterpolationOrder::Linear,
                BoundaryMode::Reflect,
            )?;
            levels.push(smaller);
        }
        levels.reverse();

        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[Image] {
        &self.levels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Image> {
        self.levels.iter()
    }

    pub fn coarsest(&self) -> Option<&Image> {
        self.levels.first()
    }

    pub fn finest(&self) -> Option<&Image> {
        self.levels.last()
    }

    pub fn shapes(&self) -> Vec<(usize, usize)> {
        self.levels.iter().map(|level| level.dim()).collect()
    }

    pub fn into_levels(self) -> Vec<Image> {
        self.levels
    }
}

impl<'a> IntoIterator for &'a Pyramid {
    type Item = &'a Image;
    type IntoIter = std::slice::Iter<'a, Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.levels.iter()
    }
}

/// Builds a pyramid with the default smoothing for `downscale`.
pub fn build_pyramid(
    image: &ArrayView2<f64>,
    max_layers: usize,
    downscale: f64,
) -> crate::Result<Pyramid> {
    Pyramid::build(image, &PyramidConfig::new(max_layers, downscale))
}
