//! Feature union: the ordered set of stages producing one feature vector per
//! message.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalyzerConfig, MessageAnalyzer};
use crate::error::{Result, TriageError};
use crate::features::matrix::{self, FeatureMatrix};
use crate::features::scalar::ScalarFeature;
use crate::features::tfidf::{CountVectorizer, TfidfVectorizer};
use crate::features::transformer::{Corpus, InputKind, Transformer};

/// Settings for the feature union.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Normalization chain used for the token-based stages.
    pub analyzer: AnalyzerConfig,
    /// Lowercase each message before analyzing it.
    pub lowercase: bool,
    /// Minimum document frequency for vocabulary terms.
    pub min_df: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            analyzer: AnalyzerConfig::default(),
            lowercase: true,
            min_df: 1,
        }
    }
}

/// One block of the union.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureStage {
    Tfidf(TfidfVectorizer),
    TokenCount(CountVectorizer),
    WordCount(ScalarFeature),
    CharacterCount(ScalarFeature),
}

impl FeatureStage {
    fn inner(&self) -> &dyn Transformer {
        match self {
            FeatureStage::Tfidf(t) => t,
            FeatureStage::TokenCount(t) => t,
            FeatureStage::WordCount(t) => t,
            FeatureStage::CharacterCount(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Transformer {
        match self {
            FeatureStage::Tfidf(t) => t,
            FeatureStage::TokenCount(t) => t,
            FeatureStage::WordCount(t) => t,
            FeatureStage::CharacterCount(t) => t,
        }
    }
}

impl Transformer for FeatureStage {
    fn input_kind(&self) -> InputKind {
        self.inner().input_kind()
    }

    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()> {
        self.inner_mut().fit(corpus)
    }

    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        self.inner().transform(corpus)
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

/// Concatenation of the TF-IDF, term-count, word-count and character-count
/// blocks, in that order.
///
/// Messages are analyzed once per batch and the token sequences are shared
/// by both vocabulary-based stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureUnion {
    config: FeatureConfig,
    analyzer: MessageAnalyzer,
    stages: Vec<FeatureStage>,
}

impl FeatureUnion {
    pub fn new(config: FeatureConfig) -> Self {
        let stages = vec![
            FeatureStage::Tfidf(TfidfVectorizer::new().with_min_df(config.min_df)),
            FeatureStage::TokenCount(CountVectorizer::new().with_min_df(config.min_df)),
            FeatureStage::WordCount(ScalarFeature::word_count()),
            FeatureStage::CharacterCount(ScalarFeature::character_count()),
        ];
        Self::with_stages(config, stages)
    }

    /// Build a union with an explicit stage list.
    pub fn with_stages(config: FeatureConfig, stages: Vec<FeatureStage>) -> Self {
        FeatureUnion {
            analyzer: MessageAnalyzer::with_config(config.analyzer),
            config,
            stages,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn stages(&self) -> &[FeatureStage] {
        &self.stages
    }

    /// Stage names and block widths, in column order.
    pub fn layout(&self) -> Vec<(&'static str, usize)> {
        self.stages
            .iter()
            .map(|s| (s.name(), s.n_features()))
            .collect()
    }

    /// Attach token sequences to the corpus if a stage needs them.
    fn prepare<'a>(&self, corpus: &Corpus<'a>) -> Result<Corpus<'a>> {
        let needs_tokens = self
            .stages
            .iter()
            .any(|s| s.input_kind() == InputKind::Tokens);

        if needs_tokens && !corpus.has_tokens() {
            Corpus::analyzed(corpus.raw().to_vec(), &self.analyzer, self.config.lowercase)
        } else {
            Ok(corpus.clone())
        }
    }

    /// Fit on raw messages.
    pub fn fit_texts(&mut self, texts: &[&str]) -> Result<()> {
        self.fit(&Corpus::new(texts.to_vec()))
    }

    /// Transform raw messages.
    pub fn transform_texts(&self, texts: &[&str]) -> Result<FeatureMatrix> {
        self.transform(&Corpus::new(texts.to_vec()))
    }
}

impl Default for FeatureUnion {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl Transformer for FeatureUnion {
    fn input_kind(&self) -> InputKind {
        InputKind::Raw
    }

    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()> {
        if corpus.is_empty() {
            return Err(TriageError::feature(
                "cannot fit feature union on an empty corpus",
            ));
        }
        let corpus = self.prepare(corpus)?;
        for stage in self.stages.iter_mut() {
            stage.fit(&corpus)?;
        }

        log::debug!("feature union fitted: {:?}", self.layout());
        Ok(())
    }

    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        let corpus = self.prepare(corpus)?;
        let blocks = self
            .stages
            .iter()
            .map(|stage| stage.transform(&corpus))
            .collect::<Result<Vec<_>>>()?;
        matrix::hstack(&blocks)
    }

    fn fit_transform(&mut self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        if corpus.is_empty() {
            return Err(TriageError::feature(
                "cannot fit feature union on an empty corpus",
            ));
        }
        let corpus = self.prepare(corpus)?;
        let blocks = self
            .stages
            .iter_mut()
            .map(|stage| stage.fit_transform(&corpus))
            .collect::<Result<Vec<_>>>()?;
        matrix::hstack(&blocks)
    }

    fn n_features(&self) -> usize {
        self.stages.iter().map(|s| s.n_features()).sum()
    }

    fn name(&self) -> &'static str {
        "feature_union"
    }
}
