//! Bounded minimization.
//!
//! [`BoundedMinimizer`] is the contract the maximum-likelihood driver calls:
//! minimize an objective from `x0` inside a box, with an iteration cap, and
//! report the best point together with the solver's own diagnostics.
//!
//! [`NelderMeadBox`] implements it with `argmin`'s Nelder–Mead simplex running
//! on the [`BoxTransform`] coordinates, so every evaluated point lies inside the
//! bounds without a penalty term.

use argmin::core::{CostFunction, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::domain::Bound;
use crate::error::EstimateError;
use crate::optim::transform::BoxTransform;

/// Scalar objective over a flat parameter vector.
pub trait Objective: Sync {
    fn cost(&self, x: &[f64]) -> Result<f64, EstimateError>;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> Result<f64, EstimateError> + Sync,
{
    fn cost(&self, x: &[f64]) -> Result<f64, EstimateError> {
        self(x)
    }
}

/// Result of one bounded minimization, passed through unjudged.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizeOutcome {
    pub best_x: Vec<f64>,
    pub best_cost: f64,
    pub n_iter: u64,
    pub n_evals: u64,
    /// `true` only when the solver's own convergence test fired.
    pub success: bool,
    pub message: String,
}

pub trait BoundedMinimizer {
    fn minimize(
        &self,
        objective: &dyn Objective,
        x0: &[f64],
        bounds: &[Bound],
        max_iter: u64,
        verbose: bool,
    ) -> Result<MinimizeOutcome, EstimateError>;
}

/// Nelder–Mead simplex on reparameterized box coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NelderMeadBox {
    /// Per-coordinate initial simplex edges in `x` space. When unset, each edge
    /// is `width_fraction` of the bound width.
    pub steps: Option<Vec<f64>>,
    /// Edge size as a fraction of the bound width (or of `max(|x0|, 1)` for a
    /// half-open or free coordinate).
    pub width_fraction: f64,
    /// Stop when the standard deviation of simplex costs falls below this.
    pub sd_tolerance: f64,
    /// Fresh simplexes built around a converged point before accepting it.
    pub restarts: u32,
}

impl Default for NelderMeadBox {
    fn default() -> Self {
        Self {
            steps: None,
            width_fraction: 0.05,
            sd_tolerance: 1e-10,
            restarts: 1,
        }
    }
}

impl NelderMeadBox {
    pub fn with_steps(mut self, steps: Vec<f64>) -> Self {
        self.steps = Some(steps);
        self
    }

    fn step(&self, j: usize, bound: &Bound, x: f64) -> f64 {
        if let Some(steps) = &self.steps {
            return steps[j];
        }
        let width = bound.high - bound.low;
        if width.is_finite() {
            self.width_fraction * width
        } else {
            self.width_fraction * x.abs().max(1.0)
        }
    }

    /// Initial simplex: `z0` plus one vertex per coordinate, stepped in `x`
    /// space and mapped back to `z`. Steps that would leave the box go the
    /// other way.
    fn initial_simplex(&self, transform: &BoxTransform, x0: &[f64], bounds: &[Bound]) -> Vec<Vec<f64>> {
        let z0 = transform.to_unbounded(x0);
        // Re-read the start point after edge nudging so steps are taken from it.
        let x_start = transform.to_bounded(&z0);

        let mut simplex = Vec::with_capacity(z0.len() + 1);
        simplex.push(z0.clone());
        for j in 0..z0.len() {
            let step = self.step(j, &bounds[j], x_start[j]);
            let mut x = x_start.clone();
            x[j] = if bounds[j].contains(x_start[j] + step) {
                x_start[j] + step
            } else {
                x_start[j] - step
            };
            let mut z = transform.to_unbounded(&x);
            // A step clamped back onto z0 would make the simplex degenerate.
            if (z[j] - z0[j]).abs() < 1e-12 {
                z[j] = z0[j] + 0.1;
            }
            simplex.push(z);
        }
        simplex
    }

    fn run_once(
        &self,
        objective: &dyn Objective,
        transform: &BoxTransform,
        x0: &[f64],
        bounds: &[Bound],
        max_iter: u64,
    ) -> Result<MinimizeOutcome, EstimateError> {
        let simplex = self.initial_simplex(transform, x0, bounds);
        let solver = NelderMead::new(simplex).with_sd_tolerance(self.sd_tolerance)?;
        let problem = BoxProblem { objective, transform };

        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(max_iter))
            .run()?;
        let state = result.state();

        let best_z = state
            .get_best_param()
            .ok_or_else(|| EstimateError::Optimizer("solver returned no parameters".into()))?;
        let (success, message) = describe(state.get_termination_status());
        Ok(MinimizeOutcome {
            best_x: transform.to_bounded(best_z),
            best_cost: state.get_best_cost(),
            n_iter: state.get_iter(),
            n_evals: state.get_func_counts().get("cost_count").copied().unwrap_or(0),
            success,
            message,
        })
    }
}

struct BoxProblem<'a> {
    objective: &'a dyn Objective,
    transform: &'a BoxTransform,
}

impl CostFunction for BoxProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, z: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let x = self.transform.to_bounded(z);
        Ok(self.objective.cost(&x)?)
    }
}

impl BoundedMinimizer for NelderMeadBox {
    fn minimize(
        &self,
        objective: &dyn Objective,
        x0: &[f64],
        bounds: &[Bound],
        max_iter: u64,
        verbose: bool,
    ) -> Result<MinimizeOutcome, EstimateError> {
        if x0.len() != bounds.len() {
            return Err(EstimateError::config(format!(
                "x0 has {} entries but {} bounds were given",
                x0.len(),
                bounds.len()
            )));
        }
        if let Some(steps) = &self.steps {
            if steps.len() != x0.len() || steps.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
                return Err(EstimateError::config(format!(
                    "need {} finite positive initial steps, got {steps:?}",
                    x0.len()
                )));
            }
        }
        let transform = BoxTransform::new(bounds)?;

        if verbose {
            debug!(dim = x0.len(), max_iter, "starting bounded Nelder-Mead");
        }

        let mut best = self.run_once(objective, &transform, x0, bounds, max_iter)?;
        let mut n_iter = best.n_iter;
        let mut n_evals = best.n_evals;

        for round in 0..self.restarts {
            let remaining = max_iter.saturating_sub(n_iter);
            if !best.success || remaining == 0 {
                break;
            }
            let next = self.run_once(objective, &transform, &best.best_x, bounds, remaining)?;
            n_iter += next.n_iter;
            n_evals += next.n_evals;
            let gain = best.best_cost - next.best_cost;
            if verbose {
                debug!(round, gain, "Nelder-Mead restart finished");
            }
            if next.best_cost < best.best_cost {
                best = next;
            }
            if gain <= self.sd_tolerance {
                break;
            }
        }

        if verbose {
            debug!(
                iterations = n_iter,
                evaluations = n_evals,
                best_cost = best.best_cost,
                "bounded Nelder-Mead finished"
            );
        }

        Ok(MinimizeOutcome {
            n_iter,
            n_evals,
            ..best
        })
    }
}

fn describe(status: &TerminationStatus) -> (bool, String) {
    match status {
        TerminationStatus::NotTerminated => (false, "solver did not terminate".to_string()),
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => (
            true,
            "converged: simplex cost spread below tolerance".to_string(),
        ),
        TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
            (false, "maximum number of iterations reached".to_string())
        }
        TerminationStatus::Terminated(other) => (false, format!("terminated: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &[f64]) -> Result<f64, EstimateError> {
        Ok((x[0] - 1.0).powi(2) + 10.0 * (x[1] + 0.5).powi(2))
    }

    #[test]
    fn finds_interior_minimum() {
        let bounds = [Bound::new(-5.0, 5.0), Bound::new(-5.0, 5.0)];
        let out = NelderMeadBox::default()
            .minimize(&quadratic, &[3.0, 2.0], &bounds, 2000, false)
            .unwrap();
        assert!((out.best_x[0] - 1.0).abs() < 1e-4, "{out:?}");
        assert!((out.best_x[1] + 0.5).abs() < 1e-4, "{out:?}");
        assert!(out.success);
        assert!(out.n_evals > 0);
    }

    #[test]
    fn respects_bounds_when_minimum_is_outside() {
        let bounds = [Bound::new(2.0, 5.0), Bound::new(-5.0, 5.0)];
        let out = NelderMeadBox::default()
            .minimize(&quadratic, &[3.0, 2.0], &bounds, 2000, false)
            .unwrap();
        assert!(out.best_x[0] > 2.0 && out.best_x[0] < 2.01, "{out:?}");
    }

    #[test]
    fn iteration_cap_is_not_an_error() {
        let bounds = [Bound::new(-5.0, 5.0), Bound::new(-5.0, 5.0)];
        let out = NelderMeadBox::default()
            .minimize(&quadratic, &[3.0, 2.0], &bounds, 3, false)
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.n_iter, 3);
        assert!(out.message.contains("maximum"));
    }

    #[test]
    fn objective_errors_propagate() {
        let failing = |_: &[f64]| -> Result<f64, EstimateError> { Err(EstimateError::config("boom")) };
        let err = NelderMeadBox::default()
            .minimize(&failing, &[0.0], &[Bound::new(-1.0, 1.0)], 10, false)
            .unwrap_err();
        assert!(matches!(err, EstimateError::Configuration(_)));
    }

    #[test]
    fn simplex_edges_do_not_scale_with_position() {
        let bounds = [Bound::new(0.0, 10_000.0), Bound::new(-1.0, 1.0)];
        let transform = BoxTransform::new(&bounds).unwrap();
        let nm = NelderMeadBox::default().with_steps(vec![0.03, 0.05]);
        for start in [[1.0, 0.0], [1497.5, 0.0]] {
            let simplex = nm.initial_simplex(&transform, &start, &bounds);
            let x0 = transform.to_bounded(&simplex[0]);
            let e1 = transform.to_bounded(&simplex[1]);
            let e2 = transform.to_bounded(&simplex[2]);
            assert!((e1[0] - x0[0] - 0.03).abs() < 1e-6, "{e1:?}");
            assert!((e2[1] - x0[1] - 0.05).abs() < 1e-9, "{e2:?}");
        }

        let default_edges = NelderMeadBox::default().initial_simplex(&transform, &[1497.5, 0.0], &bounds);
        let e2 = transform.to_bounded(&default_edges[2]);
        assert!((e2[1] - 0.1).abs() < 1e-9, "{e2:?}");
    }

    #[test]
    fn rejects_bad_steps() {
        let bounds = [Bound::new(-5.0, 5.0), Bound::new(-5.0, 5.0)];
        for steps in [vec![0.1], vec![0.1, 0.0], vec![0.1, f64::NAN]] {
            let err = NelderMeadBox::default()
                .with_steps(steps)
                .minimize(&quadratic, &[3.0, 2.0], &bounds, 10, false)
                .unwrap_err();
            assert!(matches!(err, EstimateError::Configuration(_)));
        }
    }

    #[test]
    fn restart_counts_toward_iterations() {
        let bounds = [Bound::new(-5.0, 5.0), Bound::new(-5.0, 5.0)];
        let single = NelderMeadBox { restarts: 0, ..NelderMeadBox::default() }
            .minimize(&quadratic, &[3.0, 2.0], &bounds, 2000, false)
            .unwrap();
        let restarted = NelderMeadBox::default()
            .minimize(&quadratic, &[3.0, 2.0], &bounds, 2000, false)
            .unwrap();
        assert!(restarted.n_iter > single.n_iter);
        assert!(restarted.best_cost <= single.best_cost);
        assert!(restarted.success);
    }
}
