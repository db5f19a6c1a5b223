//! Term vocabulary learned from a tokenized corpus.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Sorted term list with a term-to-column lookup.
///
/// Serialized as the plain term list; the lookup is rebuilt on load.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Learn the vocabulary of `documents`, keeping terms that occur in at
    /// least `min_df` documents. Returns the vocabulary and the document
    /// frequency of each retained term, in column order.
    pub fn learn(documents: &[Vec<String>], min_df: usize) -> (Self, Vec<usize>) {
        let mut document_frequency: AHashMap<&str, usize> = AHashMap::new();

        for doc in documents {
            let unique: AHashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<(&str, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= min_df.max(1))
            .collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let df = terms.iter().map(|(_, df)| *df).collect();
        let vocabulary = Vocabulary::from(
            terms
                .into_iter()
                .map(|(term, _)| term.to_string())
                .collect::<Vec<_>>(),
        );
        (vocabulary, df)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column of a term, if it is in the vocabulary.
    pub fn get(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    /// Terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Raw counts of in-vocabulary tokens, sorted by column.
    /// Out-of-vocabulary tokens are ignored.
    pub fn count(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for token in tokens {
            if let Some(column) = self.get(token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|(column, _)| *column);
        entries
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
        Vocabulary { terms, index }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
    }
}
