//! End-to-end text classification pipeline: feature union followed by the
//! multi-label classifier.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::classifier::{Estimator, MultiLabelClassifier};
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::features::{Corpus, FeatureConfig, FeatureUnion, Transformer};
use crate::search::grid::ModelConfig;

/// Category name to {0,1}, in the model's category order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelVector {
    entries: Vec<(String, u8)>,
}

impl LabelVector {
    pub fn new(entries: Vec<(String, u8)>) -> Self {
        LabelVector { entries }
    }

    fn from_row(categories: &[String], row: &[u8]) -> Self {
        LabelVector {
            entries: categories.iter().cloned().zip(row.iter().copied()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, value)| *value)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Names of the categories predicted positive.
    pub fn positives(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, value)| *value == 1)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Serialize for LabelVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Display for LabelVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Feature union plus per-category classifiers, fitted and applied as one
/// unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    features: FeatureUnion,
    classifier: MultiLabelClassifier,
}

impl Pipeline {
    pub fn new(features: FeatureConfig, model: ModelConfig) -> Self {
        Pipeline {
            features: FeatureUnion::new(features),
            classifier: MultiLabelClassifier::new(model),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.classifier = self.classifier.with_threshold(threshold);
        self
    }

    pub fn features(&self) -> &FeatureUnion {
        &self.features
    }

    pub fn classifier(&self) -> &MultiLabelClassifier {
        &self.classifier
    }

    pub fn model_config(&self) -> &ModelConfig {
        self.classifier.config()
    }

    /// Categories in prediction order. Empty until fitted.
    pub fn categories(&self) -> &[String] {
        self.classifier.categories()
    }

    pub fn is_fitted(&self) -> bool {
        self.classifier.is_fitted()
    }

    /// Fit features and classifiers on the given messages only.
    pub fn fit(&mut self, texts: &[&str], labels: &LabelMatrix) -> Result<()> {
        if texts.len() != labels.n_rows() {
            return Err(TriageError::model(format!(
                "{} messages but {} label rows",
                texts.len(),
                labels.n_rows()
            )));
        }
        let x = self.features.fit_transform(&Corpus::new(texts.to_vec()))?;
        self.classifier.fit(&x, labels)
    }

    /// Predict a label matrix for the given messages.
    pub fn predict(&self, texts: &[&str]) -> Result<LabelMatrix> {
        if !self.is_fitted() {
            return Err(TriageError::model("pipeline is not fitted"));
        }
        let x = self.features.transform(&Corpus::new(texts.to_vec()))?;
        self.classifier.predict(&x)
    }

    /// Predict one [`LabelVector`] per message.
    pub fn predict_labels(&self, texts: &[&str]) -> Result<Vec<LabelVector>> {
        let predicted = self.predict(texts)?;
        Ok(predicted
            .rows()
            .map(|row| LabelVector::from_row(predicted.categories(), row))
            .collect())
    }

    /// Predict the label vector of a single message.
    pub fn predict_one(&self, text: &str) -> Result<LabelVector> {
        self.predict_labels(&[text])?
            .pop()
            .ok_or_else(|| TriageError::internal("prediction returned no rows"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grid::{ClassWeight, Solver};

    fn training_data() -> (Vec<&'static str>, LabelMatrix) {
        let texts = vec![
            "we need water please",
            "no clean water here",
            "please send food",
            "hungry children need food",
            "water and food needed",
            "the weather is nice",
            "roads are open again",
            "thank you for the help",
        ];
        let labels = LabelMatrix::from_rows(
            vec!["water".into(), "food".into()],
            vec![
                vec![1, 0],
                vec![1, 0],
                vec![0, 1],
                vec![0, 1],
                vec![1, 1],
                vec![0, 0],
                vec![0, 0],
                vec![0, 0],
            ],
        )
        .unwrap();
        (texts, labels)
    }

    fn model() -> ModelConfig {
        ModelConfig {
            c: 10.0,
            max_iter: 1000,
            solver: Solver::Lbfgs,
            class_weight: ClassWeight::Balanced,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_fit_and_predict_one() {
        let (texts, labels) = training_data();
        let mut pipeline = Pipeline::new(FeatureConfig::default(), model());
        pipeline.fit(&texts, &labels).unwrap();

        let prediction = pipeline.predict_one("need water").unwrap();
        assert_eq!(prediction.len(), 2);
        assert_eq!(
            prediction.categories().collect::<Vec<_>>(),
            vec!["water", "food"]
        );
        assert_eq!(prediction.get("water"), Some(1));
        assert!(prediction.iter().all(|(_, v)| v <= 1));
    }

    #[test]
    fn test_predict_requires_fit() {
        let pipeline = Pipeline::new(FeatureConfig::default(), model());
        assert!(pipeline.predict(&["need water"]).is_err());
    }

    #[test]
    fn test_label_vector_serializes_in_order() {
        let vector = LabelVector::new(vec![("water".into(), 1), ("food".into(), 0)]);
        assert_eq!(
            serde_json::to_string(&vector).unwrap(),
            r#"{"water":1,"food":0}"#
        );
        assert_eq!(vector.to_string(), "water=1, food=0");
        assert_eq!(vector.positives(), vec!["water"]);
    }

    #[test]
    fn test_mismatched_labels() {
        let (texts, labels) = training_data();
        let mut pipeline = Pipeline::new(FeatureConfig::default(), model());
        assert!(pipeline.fit(&texts[..3], &labels).is_err());
    }
}
