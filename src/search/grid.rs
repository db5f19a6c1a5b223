//! Hyperparameter grid and the per-candidate model configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Optimization algorithm for the per-category logistic regression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Solver {
    /// Limited-memory BFGS over the full batch.
    Lbfgs,
    /// Stochastic average gradient with proximal regularization.
    Saga,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Lbfgs => write!(f, "lbfgs"),
            Solver::Saga => write!(f, "saga"),
        }
    }
}

impl FromStr for Solver {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lbfgs" => Ok(Solver::Lbfgs),
            "saga" => Ok(Solver::Saga),
            other => Err(TriageError::invalid_config(format!("unknown solver '{other}'"))),
        }
    }
}

/// Multi-class decomposition. Every category is a binary problem, so only
/// one-vs-rest is meaningful.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    Ovr,
}

impl fmt::Display for MultiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ovr")
    }
}

/// Per-sample weighting of the two classes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassWeight {
    #[default]
    None,
    /// Weight each class by `n_samples / (2 * n_class_samples)`.
    Balanced,
}

impl fmt::Display for ClassWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassWeight::None => write!(f, "none"),
            ClassWeight::Balanced => write!(f, "balanced"),
        }
    }
}

/// Worker threads used to fit categories concurrently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parallelism {
    /// Every available core.
    #[default]
    All,
    /// A dedicated pool of this many threads.
    Threads(usize),
}

impl Parallelism {
    /// Resolve to a concrete thread count.
    pub fn threads(self) -> usize {
        match self {
            Parallelism::All => num_cpus::get(),
            Parallelism::Threads(n) => n.max(1),
        }
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::All => write!(f, "-1"),
            Parallelism::Threads(n) => write!(f, "{n}"),
        }
    }
}

/// One fixed combination of classifier hyperparameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub solver: Solver,
    pub multi_class: MultiClass,
    pub class_weight: ClassWeight,
    pub n_jobs: Parallelism,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            c: 1.0,
            max_iter: 100,
            solver: Solver::Lbfgs,
            multi_class: MultiClass::Ovr,
            class_weight: ClassWeight::None,
            n_jobs: Parallelism::All,
        }
    }
}

impl ModelConfig {
    /// Check the values a solver can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(TriageError::invalid_config(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if self.max_iter == 0 {
            return Err(TriageError::invalid_config("max_iter must be at least 1"));
        }
        if self.n_jobs == Parallelism::Threads(0) {
            return Err(TriageError::invalid_config("n_jobs must be at least 1"));
        }
        Ok(())
    }

    /// Named parameter values, in grid order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("C", self.c.to_string()),
            ("max_iter", self.max_iter.to_string()),
            ("solver", self.solver.to_string()),
            ("multi_class", self.multi_class.to_string()),
            ("class_weight", self.class_weight.to_string()),
            ("n_jobs", self.n_jobs.to_string()),
        ]
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{}", params.join(", "))
    }
}

/// Candidate values for every hyperparameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub c: Vec<f64>,
    pub max_iter: Vec<usize>,
    pub solver: Vec<Solver>,
    pub multi_class: Vec<MultiClass>,
    pub class_weight: Vec<ClassWeight>,
    pub n_jobs: Vec<Parallelism>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        ParamGrid {
            c: vec![1.0, 5.0, 10.0],
            max_iter: vec![5000],
            solver: vec![Solver::Saga, Solver::Lbfgs],
            multi_class: vec![MultiClass::Ovr],
            class_weight: vec![ClassWeight::Balanced],
            n_jobs: vec![Parallelism::All],
        }
    }
}

impl ParamGrid {
    /// A grid holding exactly one configuration.
    pub fn single(config: ModelConfig) -> Self {
        ParamGrid {
            c: vec![config.c],
            max_iter: vec![config.max_iter],
            solver: vec![config.solver],
            multi_class: vec![config.multi_class],
            class_weight: vec![config.class_weight],
            n_jobs: vec![config.n_jobs],
        }
    }

    /// Number of configurations in the grid.
    pub fn len(&self) -> usize {
        self.c.len()
            * self.max_iter.len()
            * self.solver.len()
            * self.multi_class.len()
            * self.class_weight.len()
            * self.n_jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand the Cartesian product, `C` varying slowest.
    pub fn expand(&self) -> Result<Vec<ModelConfig>> {
        if self.is_empty() {
            return Err(TriageError::invalid_config(
                "every grid dimension needs at least one value",
            ));
        }

        let mut configs = Vec::with_capacity(self.len());
        for &c in &self.c {
            for &max_iter in &self.max_iter {
                for &solver in &self.solver {
                    for &multi_class in &self.multi_class {
                        for &class_weight in &self.class_weight {
                            for &n_jobs in &self.n_jobs {
                                let config = ModelConfig {
                                    c,
                                    max_iter,
                                    solver,
                                    multi_class,
                                    class_weight,
                                    n_jobs,
                                };
                                config.validate()?;
                                configs.push(config);
                            }
                        }
                    }
                }
            }
        }
        Ok(configs)
    }

    /// Whether `config` is exactly one of the grid's combinations.
    pub fn contains(&self, config: &ModelConfig) -> bool {
        self.c.contains(&config.c)
            && self.max_iter.contains(&config.max_iter)
            && self.solver.contains(&config.solver)
            && self.multi_class.contains(&config.multi_class)
            && self.class_weight.contains(&config.class_weight)
            && self.n_jobs.contains(&config.n_jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let grid = ParamGrid::default();
        let configs = grid.expand().unwrap();

        assert_eq!(grid.len(), 6);
        assert_eq!(configs.len(), 6);
        assert_eq!(configs[0].c, 1.0);
        assert_eq!(configs[0].solver, Solver::Saga);
        assert_eq!(configs[1].solver, Solver::Lbfgs);
        assert_eq!(configs[5].c, 10.0);
        assert!(configs.iter().all(|c| grid.contains(c)));
        assert!(configs.iter().all(|c| c.class_weight == ClassWeight::Balanced));
    }

    #[test]
    fn test_contains_rejects_off_grid_values() {
        let grid = ParamGrid::default();
        let config = ModelConfig {
            c: 2.0,
            ..grid.expand().unwrap()[0]
        };
        assert!(!grid.contains(&config));
    }

    #[test]
    fn test_empty_dimension_is_rejected() {
        let grid = ParamGrid {
            solver: Vec::new(),
            ..ParamGrid::default()
        };
        assert!(grid.is_empty());
        assert!(grid.expand().is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let grid = ParamGrid {
            c: vec![0.0],
            ..ParamGrid::default()
        };
        assert!(grid.expand().is_err());
    }

    #[test]
    fn test_serde_names() {
        let grid = ParamGrid::single(ModelConfig {
            n_jobs: Parallelism::Threads(4),
            ..ModelConfig::default()
        });
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["solver"][0], "lbfgs");
        assert_eq!(json["multi_class"][0], "ovr");
        assert_eq!(json["n_jobs"][0]["threads"], 4);

        let parsed: ParamGrid = serde_json::from_str(r#"{"c": [0.5], "solver": ["saga"]}"#).unwrap();
        assert_eq!(parsed.c, vec![0.5]);
        assert_eq!(parsed.max_iter, vec![5000]);
    }

    #[test]
    fn test_display() {
        let config = ModelConfig::default();
        assert_eq!(
            config.to_string(),
            "C=1, max_iter=100, solver=lbfgs, multi_class=ovr, class_weight=none, n_jobs=-1"
        );
        assert_eq!("SAGA".parse::<Solver>().unwrap(), Solver::Saga);
    }
}
