//! Powell's conjugate direction-set method.

use serde::{Deserialize, Serialize};

use super::line_search::{bracket, brent};
use super::{Evaluator, Objective, OptimizeResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowellConfig {
    /// Relative tolerance of each line search, scaled by 100 as step length
    /// tolerance.
    pub xtol: f64,
    /// Relative decrease of the objective across one sweep that counts as
    /// converged.
    pub ftol: f64,
    /// Sweep budget; `None` is `1000 * dimension`.
    pub max_iterations: Option<usize>,
    /// Evaluation budget; `None` is `1000 * dimension`.
    pub max_evaluations: Option<usize>,
}

impl Default for PowellConfig {
    fn default() -> Self {
        Self {
            xtol: 1e-4,
            ftol: 1e-4,
            max_iterations: None,
            max_evaluations: None,
        }
    }
}

/// Derivative-free local minimizer: repeated line searches along a set of
/// directions, replacing the direction of largest decrease with the net
/// displacement of each sweep when that keeps the set well conditioned.
#[derive(Debug, Clone, Default)]
pub struct Powell {
    config: PowellConfig,
}

impl Powell {
    pub fn new(config: PowellConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PowellConfig {
        &self.config
    }

    pub fn minimize<O: Objective + ?Sized>(&self, objective: &O, x0: &[f64]) -> OptimizeResult {
        let n = x0.len();
        let max_iterations = self.config.max_iterations.unwrap_or(1000 * n.max(1));
        let max_evaluations = self.config.max_evaluations.unwrap_or(1000 * n.max(1));
        let evaluator = Evaluator::with_budget(objective, max_evaluations.max(1));
        let line_tol = self.config.xtol * 100.0;

        let mut x = x0.to_vec();
        let mut fval = evaluator.call(&x);
        if n == 0 {
            return OptimizeResult {
                x,
                fun: fval,
                nfev: evaluator.calls(),
                nit: 0,
                converged: true,
            };
        }

        let mut directions: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                let mut d = vec![0.0; n];
                d[i] = 1.0;
                d
            })
            .collect();
        let mut sweep_start = x.clone();
        let mut iterations = 0;
        let mut converged = false;

        loop {
            let fx = fval;
            let mut biggest_index = 0;
            let mut biggest_decrease = 0.0;

            for (i, direction) in directions.iter().enumerate() {
                if evaluator.exhausted() {
                    break;
                }
                let before = fval;
                let (fnew, xnew, _) = line_minimize(&evaluator, &x, direction, fval, line_tol);
                fval = fnew;
                x = xnew;
                if before - fval > biggest_decrease {
                    biggest_decrease = before - fval;
                    biggest_index = i;
                }
            }
            iterations += 1;

            if evaluator.exhausted() {
                break;
            }
            if fx == fval || 2.0 * (fx - fval) <= self.config.ftol * (fx.abs() + fval.abs()) + 1e-20
            {
                converged = true;
                break;
            }
            if iterations >= max_iterations {
                break;
            }

            let displacement: Vec<f64> = x.iter().zip(&sweep_start).map(|(a, b)| a - b).collect();
            let extrapolated: Vec<f64> = x.iter().zip(&sweep_start).map(|(a, b)| 2.0 * a - b).collect();
            sweep_start = x.clone();
            let fextra = evaluator.call(&extrapolated);
            if evaluator.exhausted() {
                break;
            }

            if fx > fextra {
                let mut t = 2.0 * (fx + fextra - 2.0 * fval);
                let temp = fx - fval - biggest_decrease;
                t *= temp * temp;
                let temp = fx - fextra;
                t -= biggest_decrease * temp * temp;
                if t < 0.0 {
                    let (fnew, xnew, step) =
                        line_minimize(&evaluator, &x, &displacement, fval, line_tol);
                    fval = fnew;
                    x = xnew;
                    if step.iter().any(|&s| s != 0.0) {
                        directions[biggest_index] = directions[n - 1].clone();
                        directions[n - 1] = step;
                    }
                }
            }
        }

        OptimizeResult {
            x,
            fun: fval,
            nfev: evaluator.calls(),
            nit: iterations,
            converged,
        }
    }
}

/// Minimizes along `direction` from `x`. The move is kept only when it does
/// not worsen a finite objective, so the result never exceeds `fx`.
/// Returns `(f_new, x_new, step_taken)`.
fn line_minimize<O: Objective + ?Sized>(
    evaluator: &Evaluator<'_, O>,
    x: &[f64],
    direction: &[f64],
    fx: f64,
    tol: f64,
) -> (f64, Vec<f64>, Vec<f64>) {
    let along = |alpha: f64| -> f64 {
        let point: Vec<f64> = x.iter().zip(direction).map(|(xi, di)| xi + alpha * di).collect();
        evaluator.call(&point)
    };

    let br = bracket(&along, 0.0, 1.0);
    let (alpha, fmin, _) = brent(&along, &br, tol);

    if fmin.is_finite() && fmin <= fx {
        let step: Vec<f64> = direction.iter().map(|d| alpha * d).collect();
        let moved = x.iter().zip(&step).map(|(xi, si)| xi + si).collect();
        (fmin, moved, step)
    } else {
        (fx, x.to_vec(), vec![0.0; x.len()])
    }
}
