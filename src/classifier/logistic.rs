//! Binary L2-regularized logistic regression on sparse features.
//!
//! The fitted objective is
//!
//! ```text
//! (1/n) Σ sᵢ · logloss(yᵢ, xᵢ·β + b)  +  ‖β‖² / (2·C·n)
//! ```
//!
//! with per-sample weights `sᵢ` from the class-weight policy. The intercept
//! `b` is not penalized.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::features::FeatureMatrix;
use crate::search::grid::{ClassWeight, ModelConfig, Solver};

/// Convergence tolerance shared by both solvers.
pub const DEFAULT_TOL: f64 = 1e-4;

const LBFGS_MEMORY: usize = 10;
const ARMIJO_C1: f64 = 1e-4;
const MAX_LINE_SEARCH_STEPS: usize = 40;
const SAGA_SEED: u64 = 0x5A6A;

/// Fitted parameters of one binary problem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BinaryModel {
    /// Linear decision function.
    Linear { coef: Vec<f64>, intercept: f64 },
    /// The training column held a single value.
    Constant(u8),
}

/// Outcome of a solver run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
}

/// Logistic regression for one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    max_iter: usize,
    solver: Solver,
    class_weight: ClassWeight,
    tol: f64,
    model: Option<BinaryModel>,
}

impl LogisticRegression {
    pub fn new(config: &ModelConfig) -> Self {
        LogisticRegression {
            c: config.c,
            max_iter: config.max_iter,
            solver: config.solver,
            class_weight: config.class_weight,
            tol: DEFAULT_TOL,
            model: None,
        }
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn model(&self) -> Option<&BinaryModel> {
        self.model.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// Fit on the rows of `x` against the binary targets `y`.
    pub fn fit(&mut self, x: &FeatureMatrix, y: &[u8]) -> Result<FitReport> {
        if x.rows() != y.len() {
            return Err(TriageError::model(format!(
                "{} feature rows but {} targets",
                x.rows(),
                y.len()
            )));
        }
        if y.is_empty() {
            return Err(TriageError::model("cannot fit on zero samples"));
        }
        if let Some(bad) = y.iter().find(|&&v| v > 1) {
            return Err(TriageError::model(format!("target value {bad} is not binary")));
        }

        let positives = y.iter().filter(|&&v| v == 1).count();
        if positives == 0 || positives == y.len() {
            self.model = Some(BinaryModel::Constant(y[0]));
            return Ok(FitReport {
                iterations: 0,
                converged: true,
            });
        }

        let problem = Problem::new(x, y, self.sample_weights(y, positives), self.c);
        let (w, report) = match self.solver {
            Solver::Lbfgs => lbfgs(&problem, self.max_iter, self.tol),
            Solver::Saga => saga(&problem, self.max_iter, self.tol),
        };

        if !report.converged {
            log::warn!(
                "{} reached max_iter={} without converging",
                self.solver,
                self.max_iter
            );
        }

        let d = x.cols();
        self.model = Some(BinaryModel::Linear {
            intercept: w[d],
            coef: w[..d].to_vec(),
        });
        Ok(report)
    }

    fn sample_weights(&self, y: &[u8], positives: usize) -> Vec<f64> {
        match self.class_weight {
            ClassWeight::None => vec![1.0; y.len()],
            ClassWeight::Balanced => {
                let n = y.len() as f64;
                let w1 = n / (2.0 * positives as f64);
                let w0 = n / (2.0 * (y.len() - positives) as f64);
                y.iter().map(|&v| if v == 1 { w1 } else { w0 }).collect()
            }
        }
    }

    /// Probability of the positive class for every row.
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        match &self.model {
            None => Err(TriageError::model("classifier is not fitted")),
            Some(BinaryModel::Constant(value)) => Ok(vec![f64::from(*value); x.rows()]),
            Some(BinaryModel::Linear { coef, intercept }) => {
                if x.cols() != coef.len() {
                    return Err(TriageError::model(format!(
                        "expected {} features, got {}",
                        coef.len(),
                        x.cols()
                    )));
                }
                Ok(x.outer_iterator()
                    .map(|row| {
                        let z = intercept + row.iter().map(|(j, &v)| coef[j] * v).sum::<f64>();
                        sigmoid(z)
                    })
                    .collect())
            }
        }
    }

    /// Threshold the positive-class probability.
    pub fn predict(&self, x: &FeatureMatrix, threshold: f64) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > threshold))
            .collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

struct Problem<'a> {
    x: &'a FeatureMatrix,
    y: Vec<f64>,
    weights: Vec<f64>,
    /// L2 strength on the mean loss, `1 / (C n)`.
    alpha: f64,
}

impl<'a> Problem<'a> {
    fn new(x: &'a FeatureMatrix, y: &[u8], weights: Vec<f64>, c: f64) -> Self {
        let n = y.len() as f64;
        Problem {
            x,
            y: y.iter().map(|&v| f64::from(v)).collect(),
            weights,
            alpha: 1.0 / (c * n),
        }
    }

    fn n_samples(&self) -> usize {
        self.y.len()
    }

    fn n_features(&self) -> usize {
        self.x.cols()
    }

    /// Objective value and its gradient at `w = [β, b]`.
    fn loss_and_gradient(&self, w: &[f64], grad: &mut [f64]) -> f64 {
        let d = self.n_features();
        let n = self.n_samples() as f64;
        grad.iter_mut().for_each(|g| *g = 0.0);

        let mut loss = 0.0;
        for (i, row) in self.x.outer_iterator().enumerate() {
            let z = w[d] + row.iter().map(|(j, &v)| w[j] * v).sum::<f64>();
            loss += self.weights[i] * (softplus(z) - self.y[i] * z);

            let r = self.weights[i] * (sigmoid(z) - self.y[i]);
            for (j, &v) in row.iter() {
                grad[j] += r * v;
            }
            grad[d] += r;
        }

        loss /= n;
        grad.iter_mut().for_each(|g| *g /= n);

        let mut penalty = 0.0;
        for j in 0..d {
            penalty += w[j] * w[j];
            grad[j] += self.alpha * w[j];
        }
        loss + 0.5 * self.alpha * penalty
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// L-BFGS with backtracking Armijo line search.
fn lbfgs(problem: &Problem<'_>, max_iter: usize, tol: f64) -> (Vec<f64>, FitReport) {
    let dim = problem.n_features() + 1;
    let mut w = vec![0.0; dim];
    let mut grad = vec![0.0; dim];
    let mut f = problem.loss_and_gradient(&w, &mut grad);

    let mut history: Vec<(Vec<f64>, Vec<f64>, f64)> = Vec::with_capacity(LBFGS_MEMORY);
    let mut new_w = vec![0.0; dim];
    let mut new_grad = vec![0.0; dim];

    for iteration in 0..max_iter {
        if max_abs(&grad) <= tol {
            return (
                w,
                FitReport {
                    iterations: iteration,
                    converged: true,
                },
            );
        }

        // two-loop recursion
        let mut direction: Vec<f64> = grad.iter().map(|g| -g).collect();
        let mut alphas = Vec::with_capacity(history.len());
        for (s, y, rho) in history.iter().rev() {
            let a = rho * dot(s, &direction);
            for (d, yk) in direction.iter_mut().zip(y) {
                *d -= a * yk;
            }
            alphas.push(a);
        }
        if let Some((s, y, _)) = history.last() {
            let gamma = dot(s, y) / dot(y, y);
            direction.iter_mut().for_each(|d| *d *= gamma);
        }
        for ((s, y, rho), a) in history.iter().zip(alphas.iter().rev()) {
            let b = rho * dot(y, &direction);
            for (d, sk) in direction.iter_mut().zip(s) {
                *d += (a - b) * sk;
            }
        }

        let mut slope = dot(&grad, &direction);
        if slope >= 0.0 {
            direction = grad.iter().map(|g| -g).collect();
            slope = -dot(&grad, &grad);
            history.clear();
        }

        let mut step = if history.is_empty() {
            (1.0 / max_abs(&grad)).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_LINE_SEARCH_STEPS {
            for k in 0..dim {
                new_w[k] = w[k] + step * direction[k];
            }
            let new_f = problem.loss_and_gradient(&new_w, &mut new_grad);
            if new_f <= f + ARMIJO_C1 * step * slope {
                accepted = Some(new_f);
                break;
            }
            step *= 0.5;
        }

        let Some(new_f) = accepted else {
            // no further decrease is representable
            return (
                w,
                FitReport {
                    iterations: iteration + 1,
                    converged: true,
                },
            );
        };

        let s: Vec<f64> = new_w.iter().zip(&w).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = new_grad.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let sy = dot(&s, &y);
        if sy > 1e-10 {
            if history.len() == LBFGS_MEMORY {
                history.remove(0);
            }
            history.push((s, y, 1.0 / sy));
        }

        let decrease = (f - new_f) / f.abs().max(new_f.abs()).max(1.0);
        std::mem::swap(&mut w, &mut new_w);
        std::mem::swap(&mut grad, &mut new_grad);
        f = new_f;

        if decrease <= 64.0 * f64::EPSILON {
            return (
                w,
                FitReport {
                    iterations: iteration + 1,
                    converged: true,
                },
            );
        }
    }

    let converged = max_abs(&grad) <= tol;
    (
        w,
        FitReport {
            iterations: max_iter,
            converged,
        },
    )
}

/// SAGA with lazy (just-in-time) updates for coordinates a sample does not
/// touch. Each epoch draws `n` samples uniformly with replacement.
fn saga(problem: &Problem<'_>, max_iter: usize, tol: f64) -> (Vec<f64>, FitReport) {
    let n = problem.n_samples();
    let d = problem.n_features();
    let nf = n as f64;
    let alpha = problem.alpha;

    let max_sq_norm = problem
        .x
        .outer_iterator()
        .map(|row| row.iter().map(|(_, &v)| v * v).sum::<f64>())
        .fold(0.0, f64::max);
    let max_weight = problem.weights.iter().copied().fold(0.0, f64::max);
    let lipschitz = 0.25 * (max_sq_norm + 1.0) * max_weight + alpha;
    let gamma = 1.0 / (2.0 * lipschitz + (2.0 * nf * alpha).min(lipschitz));
    let rho = 1.0 / (1.0 + gamma * alpha);

    // Σ_{t=1..k} ρ^t
    let geometric = |k: f64| -> f64 {
        if rho < 1.0 {
            rho * (1.0 - rho.powf(k)) / (1.0 - rho)
        } else {
            k
        }
    };

    let mut beta = vec![0.0; d];
    let mut intercept = 0.0;
    let mut memory = vec![0.0; n];
    let mut sum_grad = vec![0.0; d];
    let mut sum_grad_intercept = 0.0;
    let mut last_update = vec![0u64; d];
    let mut step: u64 = 0;
    let mut rng = StdRng::seed_from_u64(SAGA_SEED);

    let catch_up = |beta_j: &mut f64, last: &mut u64, sum_j: f64, now: u64| {
        let k = now - *last;
        if k > 0 {
            let k = k as f64;
            *beta_j = rho.powf(k) * *beta_j - gamma * (sum_j / nf) * geometric(k);
            *last = now;
        }
    };

    let mut previous = vec![0.0; d + 1];
    for epoch in 0..max_iter {
        for _ in 0..n {
            let i = rng.random_range(0..n);
            let Some(row) = problem.x.outer_view(i) else {
                continue;
            };

            for (j, _) in row.iter() {
                catch_up(&mut beta[j], &mut last_update[j], sum_grad[j], step);
            }

            let z = intercept + row.iter().map(|(j, &v)| beta[j] * v).sum::<f64>();
            let g = problem.weights[i] * (sigmoid(z) - problem.y[i]);
            let delta = g - memory[i];
            memory[i] = g;

            for (j, &v) in row.iter() {
                beta[j] = rho * (beta[j] - gamma * (delta * v + sum_grad[j] / nf));
                sum_grad[j] += delta * v;
                last_update[j] = step + 1;
            }
            intercept -= gamma * (delta + sum_grad_intercept / nf);
            sum_grad_intercept += delta;
            step += 1;
        }

        for j in 0..d {
            catch_up(&mut beta[j], &mut last_update[j], sum_grad[j], step);
        }

        let mut max_change: f64 = (intercept - previous[d]).abs();
        let mut max_weight: f64 = intercept.abs();
        for j in 0..d {
            max_change = max_change.max((beta[j] - previous[j]).abs());
            max_weight = max_weight.max(beta[j].abs());
        }
        previous[..d].copy_from_slice(&beta);
        previous[d] = intercept;

        if max_change == 0.0 || (max_weight > 0.0 && max_change / max_weight <= tol) {
            return (
                previous,
                FitReport {
                    iterations: epoch + 1,
                    converged: true,
                },
            );
        }
    }

    (
        previous,
        FitReport {
            iterations: max_iter,
            converged: false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matrix::from_rows;

    /// Two separable-ish clusters on feature 0, noise on feature 1.
    fn toy() -> (FeatureMatrix, Vec<u8>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let positive = i % 4 == 0;
            let signal = if positive { 1.0 } else { -1.0 };
            rows.push(vec![(0, signal + 0.1 * (i % 3) as f64), (1, (i % 5) as f64 * 0.2)]);
            y.push(u8::from(positive));
        }
        (from_rows(2, &rows).unwrap(), y)
    }

    /// Overlapping classes, so the optimum is well conditioned.
    fn noisy() -> (FeatureMatrix, Vec<u8>) {
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..60 {
            rows.push(vec![(0, (i % 7) as f64 * 0.3 - 1.0), (2, (i % 3) as f64 * 0.5)]);
            y.push(u8::from((i * 7) % 10 < 4 || i % 7 == 6));
        }
        (from_rows(3, &rows).unwrap(), y)
    }

    fn config(solver: Solver) -> ModelConfig {
        ModelConfig {
            c: 10.0,
            max_iter: 5000,
            solver,
            class_weight: ClassWeight::Balanced,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_lbfgs_learns_signal() {
        let (x, y) = toy();
        let mut clf = LogisticRegression::new(&config(Solver::Lbfgs));
        let report = clf.fit(&x, &y).unwrap();

        assert!(report.converged);
        assert_eq!(clf.predict(&x, 0.5).unwrap(), y);
        match clf.model().unwrap() {
            BinaryModel::Linear { coef, .. } => assert!(coef[0] > 0.0),
            BinaryModel::Constant(_) => panic!("expected a linear model"),
        }
    }

    #[test]
    fn test_saga_learns_signal() {
        let (x, y) = toy();
        let mut clf = LogisticRegression::new(&config(Solver::Saga));
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.predict(&x, 0.5).unwrap(), y);
    }

    #[test]
    fn test_solvers_agree() {
        let (x, y) = noisy();
        let mut a = LogisticRegression::new(&config(Solver::Lbfgs)).with_tol(1e-8);
        let mut b = LogisticRegression::new(&config(Solver::Saga)).with_tol(1e-8);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        let pa = a.predict_proba(&x).unwrap();
        let pb = b.predict_proba(&x).unwrap();
        for (p, q) in pa.iter().zip(&pb) {
            assert!((p - q).abs() < 1e-2, "{p} vs {q}");
        }
    }

    #[test]
    fn test_constant_column_gives_constant_predictor() {
        let (x, _) = toy();
        let mut clf = LogisticRegression::new(&config(Solver::Lbfgs));
        let report = clf.fit(&x, &vec![0; 40]).unwrap();

        assert_eq!(report.iterations, 0);
        assert_eq!(clf.model(), Some(&BinaryModel::Constant(0)));
        assert!(clf.predict(&x, 0.5).unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_errors() {
        let (x, y) = toy();
        let clf = LogisticRegression::new(&ModelConfig::default());
        assert!(clf.predict_proba(&x).is_err());

        let mut clf = LogisticRegression::new(&ModelConfig::default());
        assert!(clf.fit(&x, &y[..10]).is_err());
        assert!(clf.fit(&x, &vec![2; 40]).is_err());
    }

    #[test]
    fn test_stable_link_functions() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!((softplus(800.0) - 800.0).abs() < 1e-9);
        assert!(softplus(-800.0) >= 0.0);
    }
}
