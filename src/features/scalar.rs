//! Standardized scalar features computed on raw message text.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::features::matrix::{self, FeatureMatrix};
use crate::features::transformer::{Corpus, InputKind, Transformer, ensure_fittable};

/// Zero-mean, unit-variance scaling of a single column.
///
/// Uses the population variance; a constant column keeps scale 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl Default for StandardScaler {
    fn default() -> Self {
        StandardScaler {
            mean: 0.0,
            scale: 1.0,
        }
    }
}

impl StandardScaler {
    /// Fit mean and scale on `values`.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(TriageError::feature("cannot fit a scaler on zero values"));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            1.0
        };

        Ok(StandardScaler { mean, scale })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Which scalar is measured on the raw text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    /// Number of whitespace-delimited words.
    WordCount,
    /// Number of characters.
    CharacterCount,
}

impl ScalarKind {
    pub fn measure(self, text: &str) -> f64 {
        match self {
            ScalarKind::WordCount => text.split_whitespace().count() as f64,
            ScalarKind::CharacterCount => text.chars().count() as f64,
        }
    }
}

/// One-column block holding a standardized text measurement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalarFeature {
    kind: ScalarKind,
    scaler: Option<StandardScaler>,
}

impl ScalarFeature {
    pub fn new(kind: ScalarKind) -> Self {
        ScalarFeature { kind, scaler: None }
    }

    pub fn word_count() -> Self {
        Self::new(ScalarKind::WordCount)
    }

    pub fn character_count() -> Self {
        Self::new(ScalarKind::CharacterCount)
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }
}

impl Transformer for ScalarFeature {
    fn input_kind(&self) -> InputKind {
        InputKind::Raw
    }

    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()> {
        ensure_fittable(corpus, self.name())?;
        let values: Vec<f64> = corpus.raw().iter().map(|t| self.kind.measure(t)).collect();
        self.scaler = Some(StandardScaler::fit(&values)?);
        Ok(())
    }

    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        let scaler = self
            .scaler
            .ok_or_else(|| TriageError::feature(format!("{} is not fitted", self.name())))?;
        let rows: Vec<Vec<(usize, f64)>> = corpus
            .raw()
            .iter()
            .map(|text| vec![(0, scaler.transform(self.kind.measure(text)))])
            .collect();
        matrix::from_rows(1, &rows)
    }

    fn n_features(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        match self.kind {
            ScalarKind::WordCount => "word_count",
            ScalarKind::CharacterCount => "character_count",
        }
    }
}
