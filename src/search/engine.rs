//! Cross-validated grid search over pipeline configurations.

use std::time::Instant;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_THRESHOLD;
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::features::FeatureConfig;
use crate::pipeline::Pipeline;
use crate::search::cv::{Fold, KFold};
use crate::search::grid::{ModelConfig, ParamGrid};
use crate::search::metrics::Metric;

/// Scores of the three cross-validation metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub accuracy: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::Recall => self.recall,
            Metric::F1 => self.f1,
        }
    }

    fn from_fn(f: impl Fn(Metric) -> f64) -> Self {
        MetricScores {
            accuracy: f(Metric::Accuracy),
            recall: f(Metric::Recall),
            f1: f(Metric::F1),
        }
    }
}

/// Cross-validation outcome of one grid candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub config: ModelConfig,
    pub fold_scores: Vec<MetricScores>,
    pub mean: MetricScores,
    pub std: MetricScores,
    pub mean_fit_secs: f64,
    /// 1 for the best candidate under the refit metric.
    pub rank: usize,
}

/// Everything the search learned, including the refitted best pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSearchResult {
    pub candidates: Vec<CandidateResult>,
    pub refit_metric: Metric,
    pub best_index: usize,
    pub best_pipeline: Pipeline,
}

impl GridSearchResult {
    pub fn best_config(&self) -> &ModelConfig {
        &self.candidates[self.best_index].config
    }

    /// Mean cross-validated score of the best candidate under the refit
    /// metric.
    pub fn best_score(&self) -> f64 {
        self.candidates[self.best_index].mean.get(self.refit_metric)
    }
}

#[derive(Clone, Copy, Debug)]
struct FoldOutcome {
    candidate: usize,
    fold: usize,
    scores: MetricScores,
    fit_secs: f64,
}

/// Exhaustive k-fold grid search.
///
/// Candidate/fold pairs are evaluated concurrently. The first fold that
/// fails aborts the whole search.
#[derive(Clone, Debug)]
pub struct GridSearch {
    grid: ParamGrid,
    folds: usize,
    refit_metric: Metric,
    features: FeatureConfig,
    threshold: f64,
    threads: Option<usize>,
}

impl GridSearch {
    pub fn new(grid: ParamGrid) -> Self {
        GridSearch {
            grid,
            folds: 5,
            refit_metric: Metric::F1,
            features: FeatureConfig::default(),
            threshold: DEFAULT_THRESHOLD,
            threads: None,
        }
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    pub fn with_refit_metric(mut self, metric: Metric) -> Self {
        self.refit_metric = metric;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Bound the search to a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    fn pipeline(&self, config: ModelConfig) -> Pipeline {
        Pipeline::new(self.features, config).with_threshold(self.threshold)
    }

    /// Score every candidate on every fold, pick the best and refit it on
    /// all of `texts`.
    pub fn fit(&self, texts: &[&str], labels: &LabelMatrix) -> Result<GridSearchResult> {
        if texts.len() != labels.n_rows() {
            return Err(TriageError::search(format!(
                "{} messages but {} label rows",
                texts.len(),
                labels.n_rows()
            )));
        }

        let configs = self.grid.expand()?;
        let folds = KFold::new(self.folds)?.split(texts.len())?;
        let tasks: Vec<(usize, usize)> = (0..configs.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        log::info!(
            "fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            configs.len(),
            tasks.len()
        );

        let evaluate = || {
            tasks
                .par_iter()
                .map(|&(c, f)| self.evaluate_fold(&configs[c], &folds[f], texts, labels, c, f))
                .collect::<Result<Vec<FoldOutcome>>>()
        };
        let outcomes = match self.threads {
            None => evaluate()?,
            Some(n) => ThreadPoolBuilder::new()
                .num_threads(n.max(1))
                .thread_name(|i| format!("triage-search-{i}"))
                .build()
                .map_err(|e| TriageError::internal(format!("Failed to create thread pool: {e}")))?
                .install(evaluate)?,
        };

        let mut candidates = aggregate(&configs, folds.len(), &outcomes);
        let best_index = assign_ranks(&mut candidates, self.refit_metric);

        for candidate in &candidates {
            log::info!(
                "rank {} [{}]: accuracy {:.4} recall {:.4} f1 {:.4}",
                candidate.rank,
                candidate.config,
                candidate.mean.accuracy,
                candidate.mean.recall,
                candidate.mean.f1
            );
        }

        let mut best_pipeline = self.pipeline(candidates[best_index].config);
        best_pipeline.fit(texts, labels)?;

        Ok(GridSearchResult {
            candidates,
            refit_metric: self.refit_metric,
            best_index,
            best_pipeline,
        })
    }

    /// Fit `config` on the training partition of `fold` alone. Held-out
    /// messages never reach the feature stages or the classifier.
    fn fit_fold(
        &self,
        config: &ModelConfig,
        fold: &Fold,
        texts: &[&str],
        labels: &LabelMatrix,
    ) -> Result<Pipeline> {
        let train_texts: Vec<&str> = fold.train.iter().map(|&i| texts[i]).collect();
        let train_labels = labels.select_rows(&fold.train);

        let mut pipeline = self.pipeline(*config);
        pipeline.fit(&train_texts, &train_labels)?;
        Ok(pipeline)
    }

    fn evaluate_fold(
        &self,
        config: &ModelConfig,
        fold: &Fold,
        texts: &[&str],
        labels: &LabelMatrix,
        candidate: usize,
        fold_index: usize,
    ) -> Result<FoldOutcome> {
        let started = Instant::now();
        let pipeline = self.fit_fold(config, fold, texts, labels)?;
        let fit_secs = started.elapsed().as_secs_f64();

        let test_texts: Vec<&str> = fold.test.iter().map(|&i| texts[i]).collect();
        let test_labels = labels.select_rows(&fold.test);
        let predicted = pipeline.predict(&test_texts)?;
        let scores = MetricScores {
            accuracy: Metric::Accuracy.score(&test_labels, &predicted)?,
            recall: Metric::Recall.score(&test_labels, &predicted)?,
            f1: Metric::F1.score(&test_labels, &predicted)?,
        };

        log::debug!(
            "candidate {candidate} fold {fold_index}: f1 {:.4} in {fit_secs:.2}s",
            scores.f1
        );
        Ok(FoldOutcome {
            candidate,
            fold: fold_index,
            scores,
            fit_secs,
        })
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len().max(1) as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn aggregate(configs: &[ModelConfig], n_folds: usize, outcomes: &[FoldOutcome]) -> Vec<CandidateResult> {
    configs
        .iter()
        .enumerate()
        .map(|(c, config)| {
            let mut fold_scores = vec![MetricScores::default(); n_folds];
            let mut fit_secs = Vec::with_capacity(n_folds);
            for outcome in outcomes.iter().filter(|o| o.candidate == c) {
                fold_scores[outcome.fold] = outcome.scores;
                fit_secs.push(outcome.fit_secs);
            }

            let column = |metric: Metric| -> Vec<f64> {
                fold_scores.iter().map(|s| s.get(metric)).collect()
            };
            let mean = MetricScores::from_fn(|m| mean_std(&column(m)).0);
            let std = MetricScores::from_fn(|m| mean_std(&column(m)).1);

            CandidateResult {
                config: *config,
                mean,
                std,
                fold_scores,
                mean_fit_secs: mean_std(&fit_secs).0,
                rank: 0,
            }
        })
        .collect()
}

/// Rank candidates by mean refit score. Equal scores share the lowest rank
/// and the earliest grid entry among them is selected.
/// Returns the index of the best candidate.
fn assign_ranks(candidates: &mut [CandidateResult], metric: Metric) -> usize {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (sa, sb) = (candidates[a].mean.get(metric), candidates[b].mean.get(metric));
        sb.total_cmp(&sa)
    });

    let mut previous: Option<(f64, usize)> = None;
    for (position, &i) in order.iter().enumerate() {
        let score = candidates[i].mean.get(metric);
        let rank = match previous {
            Some((last, rank)) if last.total_cmp(&score).is_eq() => rank,
            _ => position + 1,
        };
        candidates[i].rank = rank;
        previous = Some((score, rank));
    }
    order.first().copied().unwrap_or(0)
}
