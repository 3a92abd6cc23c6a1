//! Derivative-free minimizers used by the alignment driver.
//!
//! Objectives are scalar functions of a parameter vector. Any non-finite value
//! an objective returns is read as `+inf`, so degenerate regions of a cost
//! landscape are never accepted as improvements.

pub mod basin_hopping;
pub mod line_search;
pub mod powell;

use std::cell::Cell;

pub use basin_hopping::{BasinHopping, BasinHoppingConfig};
pub use powell::{Powell, PowellConfig};

/// Scalar objective to minimize.
pub trait Objective {
    fn evaluate(&self, x: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, x: &[f64]) -> f64 {
        self(x)
    }
}

/// Best point found by a minimizer.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub x: Vec<f64>,
    pub fun: f64,
    /// Objective evaluations performed.
    pub nfev: usize,
    /// Outer iterations performed.
    pub nit: usize,
    /// `false` when an iteration or evaluation budget ran out first.
    pub converged: bool,
}

/// Wraps an objective with an evaluation counter and non-finite masking.
/// Once the budget is spent every call reads `+inf` without touching the
/// objective.
pub(crate) struct Evaluator<'a, O: Objective + ?Sized> {
    objective: &'a O,
    calls: Cell<usize>,
    budget: usize,
}

impl<'a, O: Objective + ?Sized> Evaluator<'a, O> {
    pub(crate) fn new(objective: &'a O) -> Self {
        Self::with_budget(objective, usize::MAX)
    }

    pub(crate) fn with_budget(objective: &'a O, budget: usize) -> Self {
        Self {
            objective,
            calls: Cell::new(0),
            budget,
        }
    }

    pub(crate) fn call(&self, x: &[f64]) -> f64 {
        if self.exhausted() {
            return f64::INFINITY;
        }
        self.calls.set(self.calls.get() + 1);
        let value = self.objective.evaluate(x);
        if value.is_finite() {
            value
        } else {
            f64::INFINITY
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.calls.get() >= self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluator_masks_non_finite() {
        let objective = |x: &[f64]| if x[0] > 0.0 { f64::NAN } else { x[0] };
        let evaluator = Evaluator::new(&objective);
        assert_eq!(evaluator.call(&[-1.0]), -1.0);
        assert_eq!(evaluator.call(&[1.0]), f64::INFINITY);
        assert_eq!(evaluator.calls(), 2);
    }

    #[test]
    fn test_evaluator_stops_at_budget() {
        let hits = Cell::new(0);
        let objective = |x: &[f64]| {
            hits.set(hits.get() + 1);
            x[0]
        };
        let evaluator = Evaluator::with_budget(&objective, 2);
        assert_eq!(evaluator.call(&[1.0]), 1.0);
        assert!(!evaluator.exhausted());
        assert_eq!(evaluator.call(&[2.0]), 2.0);
        assert!(evaluator.exhausted());
        assert_eq!(evaluator.call(&[3.0]), f64::INFINITY);
        assert_eq!(evaluator.calls(), 2);
        assert_eq!(hits.get(), 2);
    }
}
