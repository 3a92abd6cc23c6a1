//! Basin-hopping global minimization.
//!
//! Each hop perturbs the current point uniformly within `±stepsize` per
//! coordinate, runs a local Powell minimization from there and accepts the new
//! local minimum with the Metropolis criterion at `temperature`. The step size
//! adapts every `interval` hops toward `target_accept_rate`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::powell::{Powell, PowellConfig};
use super::{Objective, OptimizeResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasinHoppingConfig {
    /// Number of hops after the initial local minimization.
    pub niter: usize,
    pub temperature: f64,
    pub stepsize: f64,
    /// Hops between step size adjustments.
    pub interval: usize,
    pub target_accept_rate: f64,
    /// Multiplier (or divisor) applied to the step size at each adjustment.
    pub step_factor: f64,
    /// Stop after this many consecutive hops without a new global minimum.
    pub niter_success: Option<usize>,
    /// Seed for the displacement generator; `None` draws from the OS.
    pub seed: Option<u64>,
    /// Local minimizer run after every hop.
    pub local: PowellConfig,
}

impl Default for BasinHoppingConfig {
    fn default() -> Self {
        Self {
            niter: 100,
            temperature: 1.0,
            stepsize: 0.5,
            interval: 50,
            target_accept_rate: 0.5,
            step_factor: 0.9,
            niter_success: None,
            seed: None,
            local: PowellConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BasinHopping {
    config: BasinHoppingConfig,
}

impl BasinHopping {
    pub fn new(config: BasinHoppingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BasinHoppingConfig {
        &self.config
    }

    pub fn minimize<O: Objective + ?Sized>(&self, objective: &O, x0: &[f64]) -> OptimizeResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let local = Powell::new(self.config.local.clone());

        let first = local.minimize(objective, x0);
        let mut nfev = first.nfev;
        let mut current = first.clone();
        let mut best = first;

        let mut stepsize = self.config.stepsize;
        let mut steps_taken = 0usize;
        let mut accepted = 0usize;
        let mut since_improvement = 0usize;
        let mut hops = 0usize;

        for hop in 0..self.config.niter {
            hops = hop + 1;
            let trial: Vec<f64> = current
                .x
                .iter()
                .map(|xi| xi + rng.gen_range(-stepsize..=stepsize))
                .collect();
            steps_taken += 1;

            let candidate = local.minimize(objective, &trial);
            nfev += candidate.nfev;

            let accept = self.metropolis(candidate.fun, current.fun, &mut rng);
            if accept {
                accepted += 1;
            }

            since_improvement += 1;
            if candidate.fun < best.fun {
                best = candidate.clone();
                since_improvement = 0;
            }

            trace!(
                hop,
                fun = candidate.fun,
                current = current.fun,
                best = best.fun,
                accept,
                stepsize,
                "basin-hopping step"
            );

            if accept {
                current = candidate;
            }

            if self.config.interval > 0 && steps_taken % self.config.interval == 0 {
                stepsize = self.adjust_stepsize(stepsize, accepted, steps_taken);
            }

            if let Some(limit) = self.config.niter_success {
                if since_improvement >= limit {
                    debug!(hop, limit, "basin-hopping stopped without improvement");
                    break;
                }
            }
        }

        debug!(
            hops,
            nfev,
            best = best.fun,
            accept_rate = accepted as f64 / steps_taken.max(1) as f64,
            "basin-hopping finished"
        );

        OptimizeResult {
            x: best.x,
            fun: best.fun,
            nfev,
            nit: hops,
            converged: best.converged,
        }
    }

    fn metropolis(&self, new: f64, old: f64, rng: &mut StdRng) -> bool {
        if new < old {
            return true;
        }
        if !new.is_finite() || !old.is_finite() {
            return false;
        }
        let weight = (-(new - old) / self.config.temperature).min(0.0).exp();
        rng.gen::<f64>() < weight
    }

    fn adjust_stepsize(&self, stepsize: f64, accepted: usize, steps: usize) -> f64 {
        let rate = accepted as f64 / steps as f64;
        let adjusted = if rate > self.config.target_accept_rate {
            stepsize / self.config.step_factor
        } else {
            stepsize * self.config.step_factor
        };
        debug!(rate, stepsize = adjusted, "adapted basin-hopping step size");
        adjusted
    }
}
