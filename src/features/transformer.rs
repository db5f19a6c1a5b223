//! The fit/transform contract shared by every feature stage.

use rayon::prelude::*;

use crate::analysis::MessageAnalyzer;
use crate::error::{Result, TriageError};
use crate::features::matrix::FeatureMatrix;

/// What a stage reads from each document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// The analyzed token sequence.
    Tokens,
    /// The untouched message text.
    Raw,
}

/// A batch of documents, optionally carrying their token sequences.
///
/// Tokenization is done once per batch and shared by every token-based
/// stage.
#[derive(Clone, Debug)]
pub struct Corpus<'a> {
    raw: Vec<&'a str>,
    tokens: Option<Vec<Vec<String>>>,
}

impl<'a> Corpus<'a> {
    pub fn new(raw: Vec<&'a str>) -> Self {
        Corpus { raw, tokens: None }
    }

    /// Analyze every document, lowercasing first when asked to.
    pub fn analyzed(raw: Vec<&'a str>, analyzer: &MessageAnalyzer, lowercase: bool) -> Result<Self> {
        let tokens = raw
            .par_iter()
            .map(|doc| {
                if lowercase {
                    analyzer.tokens(&doc.to_lowercase())
                } else {
                    analyzer.tokens(doc)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Corpus {
            raw,
            tokens: Some(tokens),
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &[&'a str] {
        &self.raw
    }

    pub fn has_tokens(&self) -> bool {
        self.tokens.is_some()
    }

    /// Token sequences, one per document.
    pub fn tokens(&self) -> Result<&[Vec<String>]> {
        self.tokens
            .as_deref()
            .ok_or_else(|| TriageError::feature("corpus has not been tokenized"))
    }
}

/// A feature stage with separate fit and transform phases.
///
/// `fit` learns state from a training corpus only; `transform` is a pure
/// function of that state and the input.
pub trait Transformer: Send + Sync {
    /// What this stage reads from each document.
    fn input_kind(&self) -> InputKind;

    /// Learn parameters from the corpus.
    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()>;

    /// Map the corpus to a feature block with one row per document.
    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix>;

    /// Width of the block produced by `transform`.
    fn n_features(&self) -> usize;

    /// Stage name used in logs and reports.
    fn name(&self) -> &'static str;

    fn fit_transform(&mut self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        self.fit(corpus)?;
        self.transform(corpus)
    }
}

/// Reject fitting on a corpus without documents.
pub(crate) fn ensure_fittable(corpus: &Corpus<'_>, stage: &str) -> Result<()> {
    if corpus.is_empty() {
        return Err(TriageError::feature(format!(
            "cannot fit {stage} on an empty corpus"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_corpus_has_no_tokens() {
        let corpus = Corpus::new(vec!["need water"]);
        assert_eq!(corpus.len(), 1);
        assert!(!corpus.has_tokens());
        assert!(corpus.tokens().is_err());
    }

    #[test]
    fn test_analyzed_corpus_lowercases_first() {
        let analyzer = MessageAnalyzer::new();
        let corpus = Corpus::analyzed(vec!["The tents", "!!!"], &analyzer, true).unwrap();
        let tokens = corpus.tokens().unwrap();

        assert_eq!(tokens[0], vec!["tents"]);
        assert!(tokens[1].is_empty());
    }

    #[test]
    fn test_empty_corpus_is_not_fittable() {
        assert!(ensure_fittable(&Corpus::new(Vec::new()), "tfidf").is_err());
    }
}
