//! Iterative relaxation-labelling solver.
//!
//! Each iteration computes, for every label of every ambiguous vertex, a
//! support from the constraints on that label, updates the label's weight
//! through the configured [`UpdateRule`], and renormalizes the vertex. The
//! whole current table is read before the next one is written; vertices are
//! visited in index order, so results are deterministic.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::config::RelaxConfig;
use crate::graph::LabelingProblem;
use crate::solver::UpdateRule;

/// Summary of a solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    /// Iterations performed.
    pub iterations: u32,
    /// Largest probability change seen in the last iteration.
    pub max_change: f64,
    /// True if the last change dropped below epsilon.
    pub converged: bool,
}

/// Relaxation-labelling solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationSolver {
    max_iter: u32,
    scale_factor: f64,
    epsilon: f64,
    single_factor: f64,
    rule: UpdateRule,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self::from_config(&RelaxConfig::default())
    }
}

impl RelaxationSolver {
    /// Create a solver from the solver-related fields of a config.
    #[must_use]
    pub fn from_config(config: &RelaxConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            scale_factor: config.scale_factor,
            epsilon: config.epsilon,
            single_factor: config.single_factor,
            rule: config.update_rule,
        }
    }

    /// Iterate until the largest change drops below epsilon or the
    /// iteration budget runs out. Non-convergence is not an error; the
    /// state reached is left in `problem`.
    pub fn solve(&self, problem: &mut LabelingProblem) -> SolveReport {
        let mut next = problem.weights.clone();
        let mut report = SolveReport::default();

        while report.iterations < self.max_iter {
            let change = self.step_into(problem, &mut next);
            std::mem::swap(&mut problem.weights, &mut next);
            report.iterations += 1;
            report.max_change = change;
            trace!(iteration = report.iterations, change, "relaxation iteration");

            if change < self.epsilon || change == 0.0 {
                report.converged = true;
                break;
            }
        }

        if !report.converged && self.max_iter > 0 {
            warn!(
                iterations = report.iterations,
                max_change = report.max_change,
                epsilon = self.epsilon,
                rule = self.rule.name(),
                "relaxation did not converge"
            );
        }
        report
    }

    /// Run a single iteration and return the largest probability change.
    pub fn step(&self, problem: &mut LabelingProblem) -> f64 {
        let mut next = problem.weights.clone();
        let change = self.step_into(problem, &mut next);
        std::mem::swap(&mut problem.weights, &mut next);
        change
    }

    /// Support for one label slot against the current table.
    fn support(&self, problem: &LabelingProblem, slot: usize, is_self: bool) -> f64 {
        let current = &problem.weights;
        let prior = if is_self { self.single_factor } else { 0.0 };
        problem.constraints[slot].iter().fold(prior, |acc, constraint| {
            let influence: f64 = constraint
                .conjunction()
                .iter()
                .map(|at| current[problem.offsets[at.vertex] + at.label])
                .product();
            acc + constraint.compatibility() * influence
        })
    }

    fn step_into(&self, problem: &LabelingProblem, next: &mut [f64]) -> f64 {
        let current = &problem.weights;
        let mut change = 0.0_f64;

        for vertex in 0..problem.num_vertices() {
            let start = problem.offsets[vertex];
            let end = problem.offsets[vertex + 1];

            // Unambiguous vertices never move.
            if end - start < 2 {
                next[start..end].copy_from_slice(&current[start..end]);
                continue;
            }

            let self_slot = start + problem.self_label(vertex);
            let mut norm = 0.0;
            for slot in start..end {
                let p = current[slot];
                let updated = if p > 0.0 {
                    let support = self.support(problem, slot, slot == self_slot);
                    self.rule.update(p, support, self.scale_factor)
                } else {
                    0.0
                };
                next[slot] = updated;
                norm += updated;
            }

            if norm > 0.0 && norm.is_finite() {
                for w in &mut next[start..end] {
                    *w /= norm;
                }
            } else if norm == f64::INFINITY {
                rescale_overflow(&mut next[start..end]);
            } else {
                for slot in start..end {
                    next[slot] = if slot == self_slot { 1.0 } else { 0.0 };
                }
            }

            for slot in start..end {
                change = change.max((next[slot] - current[slot]).abs());
            }
        }
        change
    }
}

/// Normalize a vertex whose unnormalized weights sum past `f64::MAX`.
///
/// Labels that overflowed to `+inf` share the mass evenly. If none did,
/// the sum overflowed on its own and the weights are scaled down by their
/// peak before the usual normalization.
fn rescale_overflow(weights: &mut [f64]) {
    let overflowed = weights.iter().filter(|w| w.is_infinite()).count();
    if overflowed > 0 {
        let share = 1.0 / overflowed as f64;
        for w in weights.iter_mut() {
            *w = if w.is_infinite() { share } else { 0.0 };
        }
        return;
    }

    let peak = weights.iter().copied().fold(0.0_f64, f64::max);
    let norm: f64 = weights.iter().map(|w| w / peak).sum();
    for w in weights.iter_mut() {
        *w = *w / peak / norm;
    }
}
