//! Coarse-to-fine rigid alignment driver.
//!
//! Both images are decomposed into Gaussian pyramids and walked from the
//! coarsest level to the original resolution. Every level refines the running
//! estimate with the current strategy; translations are rescaled between
//! levels because they are expressed in that level's pixels.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use instant::Instant;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cost::NmiCost;
use crate::error::AlignError;
use crate::filters::InterpolationOrder;
use crate::logging::{clear_correlation_id, get_correlation_id, new_correlation_id, AlignmentSpan};
use crate::metric::DEFAULT_BINS;
use crate::optimizer::{BasinHopping, BasinHoppingConfig, Objective, OptimizeResult, Powell, PowellConfig};
use crate::pyramid::{Pyramid, PyramidConfig};
use crate::transform::{make_transform, RigidTransform, TransformParameters};

/// Optimizer family applied at a pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Basin-hopping around local Powell runs.
    Global,
    /// A single Powell run from the current estimate.
    Local,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Global
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl FromStr for Strategy {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" | "bh" | "basinhopping" | "basin-hopping" => Ok(Self::Global),
            "local" | "powell" => Ok(Self::Local),
            other => Err(AlignError::invalid_parameter(format!(
                "unknown strategy '{}' (expected global or local)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Strategy at the coarsest level.
    pub strategy: Strategy,
    /// Once a global level at or below this index has run, the remaining
    /// finer levels switch to the local strategy.
    pub global_level_threshold: usize,
    /// Resampling kernel used when warping the target during optimization.
    pub interpolation: InterpolationOrder,
    pub histogram_bins: usize,
    pub pyramid: PyramidConfig,
    pub basin_hopping: BasinHoppingConfig,
    pub powell: PowellConfig,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Global,
            global_level_threshold: 4,
            interpolation: InterpolationOrder::Cubic,
            histogram_bins: DEFAULT_BINS,
            pyramid: PyramidConfig::default(),
            basin_hopping: BasinHoppingConfig::default(),
            powell: PowellConfig::default(),
        }
    }
}

impl AlignmentConfig {
    pub fn validate(&self) -> Result<(), AlignError> {
        self.pyramid.validate()?;
        if self.histogram_bins == 0 {
            return Err(AlignError::invalid_parameter("histogram_bins must be at least 1"));
        }
        let bh = &self.basin_hopping;
        if !(bh.temperature > 0.0) {
            return Err(AlignError::invalid_parameter(format!(
                "basin-hopping temperature must be positive, got {}",
                bh.temperature
            )));
        }
        if !(bh.stepsize >= 0.0) || !bh.stepsize.is_finite() {
            return Err(AlignError::invalid_parameter(format!(
                "basin-hopping stepsize must be finite and non-negative, got {}",
                bh.stepsize
            )));
        }
        if !(bh.step_factor > 0.0 && bh.step_factor <= 1.0) {
            return Err(AlignError::invalid_parameter(format!(
                "basin-hopping step_factor must lie in (0, 1], got {}",
                bh.step_factor
            )));
        }
        for (name, powell) in [("powell", &self.powell), ("basin_hopping.local", &bh.local)] {
            if !(powell.xtol > 0.0) || !(powell.ftol > 0.0) {
                return Err(AlignError::invalid_parameter(format!(
                    "{} tolerances must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of one pyramid level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelReport {
    /// Downscale steps above the original resolution; 0 is the original.
    pub level: usize,
    pub shape: (usize, usize),
    pub strategy: Strategy,
    pub initial_params: TransformParameters,
    pub final_params: TransformParameters,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub evaluations: usize,
    pub converged: bool,
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub transform: RigidTransform,
    /// Levels in the order they ran, coarsest first.
    pub levels: Vec<LevelReport>,
    pub correlation_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub total_ms: f64,
}

impl AlignmentReport {
    pub fn final_cost(&self) -> Option<f64> {
        self.levels.last().map(|level| level.final_cost)
    }

    pub fn evaluations(&self) -> usize {
        self.levels.iter().map(|level| level.evaluations).sum()
    }
}

/// Reusable coarse-to-fine aligner.
#[derive(Debug, Clone, Default)]
pub struct Aligner {
    config: AlignmentConfig,
}

impl Aligner {
    pub fn new(config: AlignmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Transform that, used with [`crate::filters::warp`], maps `target` onto
    /// `reference`.
    pub fn align(
        &self,
        reference: &ArrayView2<f64>,
        target: &ArrayView2<f64>,
    ) -> crate::Result<RigidTransform> {
        Ok(self.align_with_report(reference, target)?.transform)
    }

    pub fn align_with_report(
        &self,
        reference: &ArrayView2<f64>,
        target: &ArrayView2<f64>,
    ) -> crate::Result<AlignmentReport> {
        self.config.validate()?;
        AlignError::check_shapes(reference.dim(), target.dim())?;

        // Nested calls share the caller's id.
        let (correlation_id, owned) = match get_correlation_id() {
            Some(id) => (id, false),
            None => (new_correlation_id(), true),
        };
        let report = self.run(reference, target, correlation_id);
        if owned {
            clear_correlation_id();
        }
        report
    }

    fn run(
        &self,
        reference: &ArrayView2<f64>,
        target: &ArrayView2<f64>,
        correlation_id: Uuid,
    ) -> crate::Result<AlignmentReport> {
        let started_at = Utc::now();
        let reference_pyramid = Pyramid::build(reference, &self.config.pyramid)?;
        let target_pyramid = Pyramid::build(target, &self.config.pyramid)?;
        if reference_pyramid.len() != target_pyramid.len() {
            return Err(AlignError::PyramidMismatch {
                reference: reference_pyramid.len(),
                target: target_pyramid.len(),
            }
            .into());
        }

        let span = AlignmentSpan::new(reference.dim(), reference_pyramid.len(), Some(correlation_id));
        let _entered = span.enter();

        let coarsest = reference_pyramid.len() - 1;
        let mut params = TransformParameters::zeros();
        let mut strategy = self.config.strategy;
        let mut levels = Vec::with_capacity(reference_pyramid.len());

        for (i, (reference_level, target_level)) in
            reference_pyramid.iter().zip(target_pyramid.iter()).enumerate()
        {
            let level = coarsest - i;
            if i > 0 {
                params = params.scale_translation(self.config.pyramid.downscale);
            }

            let report = self.optimize_level(
                level,
                &reference_level.view(),
                &target_level.view(),
                params,
                strategy,
            )?;
            span.record_level(&report);
            params = report.final_params;
            levels.push(report);

            if strategy == Strategy::Global && level <= self.config.global_level_threshold {
                strategy = Strategy::Local;
            }
        }

        let transform = make_transform(&params);
        let final_cost = levels.last().map_or(f64::NAN, |level| level.final_cost);
        span.record_result(&transform, final_cost);

        Ok(AlignmentReport {
            transform,
            levels,
            correlation_id,
            started_at,
            total_ms: span.elapsed_ms(),
        })
    }

    fn optimize_level(
        &self,
        level: usize,
        reference: &ArrayView2<f64>,
        target: &ArrayView2<f64>,
        initial: TransformParameters,
        strategy: Strategy,
    ) -> crate::Result<LevelReport> {
        let cost = NmiCost::new(reference.view(), target.view())?
            .with_interpolation(self.config.interpolation)
            .with_bins(self.config.histogram_bins)?;
        let start = Instant::now();
        let x0 = initial.to_array();
        let initial_cost = cost.evaluate(&x0);

        let result: OptimizeResult = match strategy {
            Strategy::Global => BasinHopping::new(self.config.basin_hopping.clone()).minimize(&cost, &x0),
            Strategy::Local => Powell::new(self.config.powell.clone()).minimize(&cost, &x0),
        };

        Ok(LevelReport {
            level,
            shape: reference.dim(),
            strategy,
            initial_params: initial,
            final_params: TransformParameters::from_slice(&result.x),
            initial_cost,
            final_cost: result.fun,
            evaluations: result.nfev + 1,
            converged: result.converged,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Estimates the rigid transform aligning `target` onto `reference` with the
/// default optimizer settings.
pub fn align(
    reference: &ArrayView2<f64>,
    target: &ArrayView2<f64>,
    max_layers: usize,
    downscale: f64,
    strategy: Strategy,
) -> crate::Result<RigidTransform> {
    let config = AlignmentConfig {
        pyramid: PyramidConfig::new(max_layers, downscale),
        strategy,
        ..AlignmentConfig::default()
    };
    Aligner::new(config).align(reference, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn small_budget() -> AlignmentConfig {
        AlignmentConfig {
            pyramid: PyramidConfig::new(5, 2.0),
            histogram_bins: 16,
            basin_hopping: BasinHoppingConfig {
                niter: 1,
                seed: Some(5),
                local: PowellConfig {
                    max_iterations: Some(1),
                    ..PowellConfig::default()
                },
                ..BasinHoppingConfig::default()
            },
            powell: PowellConfig {
                max_iterations: Some(1),
                ..PowellConfig::default()
            },
            ..AlignmentConfig::default()
        }
    }

    fn scene(size: usize) -> Array2<f64> {
        Array2::from_shape_fn((size, size), |(r, c)| {
            let (x, y) = (c as f64 / size as f64, r as f64 / size as f64);
            (6.0 * x).sin() * (4.0 * y).cos() + x * y
        })
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("global".parse::<Strategy>().unwrap(), Strategy::Global);
        assert_eq!("BH".parse::<Strategy>().unwrap(), Strategy::Global);
        assert_eq!("powell".parse::<Strategy>().unwrap(), Strategy::Local);
        assert!("annealing".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Local.to_string(), "local");
    }

    #[test]
    fn test_strategy_switch_boundary() {
        let image = scene(32);
        let report = Aligner::new(small_budget())
            .align_with_report(&image.view(), &image.view())
            .unwrap();

        let levels: Vec<usize> = report.levels.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![5, 4, 3, 2, 1, 0]);
        let strategies: Vec<Strategy> = report.levels.iter().map(|l| l.strategy).collect();
        assert_eq!(
            strategies,
            vec![
                Strategy::Global,
                Strategy::Global,
                Strategy::Local,
                Strategy::Local,
                Strategy::Local,
                Strategy::Local
            ]
        );
    }

    #[test]
    fn test_local_strategy_never_runs_global() {
        let image = scene(16);
        let config = AlignmentConfig {
            strategy: Strategy::Local,
            ..small_budget()
        };
        let report = Aligner::new(config)
            .align_with_report(&image.view(), &image.view())
            .unwrap();
        assert!(report.levels.iter().all(|l| l.strategy == Strategy::Local));
    }

    #[test]
    fn test_translation_rescaled_between_levels() {
        let image = scene(32);
        let report = Aligner::new(small_budget())
            .align_with_report(&image.view(), &image.view())
            .unwrap();
        for pair in report.levels.windows(2) {
            let expected = pair[0].final_params.scale_translation(2.0);
            assert_eq!(pair[1].initial_params, expected);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let a = scene(16);
        let b = Array2::<f64>::zeros((16, 17));
        let err = align(&a.view(), &b.view(), 2, 2.0, Strategy::Local).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AlignError>(),
            Some(AlignError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let image = scene(8);
        let config = AlignmentConfig {
            histogram_bins: 0,
            ..AlignmentConfig::default()
        };
        assert!(Aligner::new(config).align(&image.view(), &image.view()).is_err());
    }

    #[test]
    fn test_correlation_id_is_released() {
        clear_correlation_id();
        let image = scene(16);
        let report = Aligner::new(AlignmentConfig {
            strategy: Strategy::Local,
            ..small_budget()
        })
        .align_with_report(&image.view(), &image.view())
        .unwrap();
        assert!(get_correlation_id().is_none());
        assert!(!report.correlation_id.is_nil());
    }
}
