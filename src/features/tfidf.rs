//! TF-IDF and term-count vectorizers over analyzed tokens.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::features::matrix::{self, FeatureMatrix};
use crate::features::transformer::{Corpus, InputKind, Transformer, ensure_fittable};
use crate::features::vocabulary::Vocabulary;

/// TF-IDF vectorizer.
///
/// Weights are raw term frequency times the smoothed inverse document
/// frequency `ln((1 + n) / (1 + df)) + 1`; each row is then scaled to unit
/// L2 norm. Documents without in-vocabulary terms map to an all-zero row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    min_df: usize,
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    n_documents: usize,
    fitted: bool,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore terms that appear in fewer than `min_df` training documents.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Weighted, normalized entries of one token sequence.
    pub fn weights(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut entries = self.vocabulary.count(tokens);
        for (column, value) in entries.iter_mut() {
            *value *= self.idf[*column];
        }

        let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in entries.iter_mut() {
                *value /= norm;
            }
        }
        entries
    }
}

impl Transformer for TfidfVectorizer {
    fn input_kind(&self) -> InputKind {
        InputKind::Tokens
    }

    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()> {
        ensure_fittable(corpus, self.name())?;
        let documents = corpus.tokens()?;

        let (vocabulary, df) = Vocabulary::learn(documents, self.min_df);
        let n = documents.len() as f64;
        self.idf = df
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = vocabulary;
        self.n_documents = documents.len();
        self.fitted = true;

        log::debug!(
            "tfidf fitted on {} documents, {} terms",
            self.n_documents,
            self.vocabulary.len()
        );
        Ok(())
    }

    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        if !self.fitted {
            return Err(TriageError::feature("tfidf vectorizer is not fitted"));
        }
        let rows: Vec<Vec<(usize, f64)>> =
            corpus.tokens()?.iter().map(|doc| self.weights(doc)).collect();
        matrix::from_rows(self.vocabulary.len(), &rows)
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &'static str {
        "tfidf"
    }
}

/// Raw term-count vectorizer with its own vocabulary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountVectorizer {
    min_df: usize,
    vocabulary: Vocabulary,
    fitted: bool,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Transformer for CountVectorizer {
    fn input_kind(&self) -> InputKind {
        InputKind::Tokens
    }

    fn fit(&mut self, corpus: &Corpus<'_>) -> Result<()> {
        ensure_fittable(corpus, self.name())?;
        let (vocabulary, _) = Vocabulary::learn(corpus.tokens()?, self.min_df);
        self.vocabulary = vocabulary;
        self.fitted = true;
        Ok(())
    }

    fn transform(&self, corpus: &Corpus<'_>) -> Result<FeatureMatrix> {
        if !self.fitted {
            return Err(TriageError::feature("count vectorizer is not fitted"));
        }
        let rows: Vec<Vec<(usize, f64)>> = corpus
            .tokens()?
            .iter()
            .map(|doc| self.vocabulary.count(doc))
            .collect();
        matrix::from_rows(self.vocabulary.len(), &rows)
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &'static str {
        "token_count"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MessageAnalyzer;
    use crate::features::matrix::dense_row;

    fn corpus<'a>(docs: Vec<&'a str>) -> Corpus<'a> {
        Corpus::analyzed(docs, &MessageAnalyzer::new(), true).unwrap()
    }

    #[test]
    fn test_tfidf_idf_and_normalization() {
        let train = corpus(vec!["water food", "water"]);
        let mut tfidf = TfidfVectorizer::new();
        let m = tfidf.fit_transform(&train).unwrap();

        assert_eq!(tfidf.vocabulary().terms(), &["food", "water"]);
        // food: df 1 of 2, water: df 2 of 2
        let idf_food = (3.0f64 / 2.0).ln() + 1.0;
        assert!((tfidf.idf()[0] - idf_food).abs() < 1e-12);
        assert!((tfidf.idf()[1] - 1.0).abs() < 1e-12);

        let row = dense_row(&m, 0);
        let norm = (row[0] * row[0] + row[1] * row[1]).sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(row[0] > row[1]);
        assert_eq!(dense_row(&m, 1), vec![0.0, 1.0]);
    }

    #[test]
    fn test_tfidf_unknown_terms_give_zero_row() {
        let mut tfidf = TfidfVectorizer::new();
        tfidf.fit(&corpus(vec!["water food"])).unwrap();

        let m = tfidf.transform(&corpus(vec!["medicine", "!!!"])).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn test_tfidf_requires_fit_and_documents() {
        let tfidf = TfidfVectorizer::new();
        assert!(tfidf.transform(&corpus(vec!["water"])).is_err());

        let mut tfidf = TfidfVectorizer::new();
        assert!(matches!(
            tfidf.fit(&corpus(Vec::new())),
            Err(TriageError::Feature(_))
        ));
    }

    #[test]
    fn test_count_vectorizer() {
        let mut counts = CountVectorizer::new();
        let m = counts
            .fit_transform(&corpus(vec!["water water food", "tents"]))
            .unwrap();

        assert_eq!(counts.n_features(), 3);
        assert_eq!(dense_row(&m, 0), vec![1.0, 0.0, 2.0]);
        assert_eq!(dense_row(&m, 1), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_count_vectorizer_min_df() {
        let mut counts = CountVectorizer::new().with_min_df(2);
        counts
            .fit(&corpus(vec!["water food", "water tents"]))
            .unwrap();
        assert_eq!(counts.vocabulary().terms(), &["water"]);
    }

    #[test]
    fn test_degenerate_tokenization_does_not_fail() {
        let mut tfidf = TfidfVectorizer::new();
        let m = tfidf.fit_transform(&corpus(vec!["!!!", "42"])).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 0);
    }
}
