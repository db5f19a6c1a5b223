//! Feature extraction.
//!
//! ```text
//! messages ─┬─ analyze ─┬─ TfidfVectorizer ──┐
//!           │           └─ CountVectorizer ──┤
//!           ├─ word count ─ StandardScaler ──┼─ hstack ─ FeatureMatrix
//!           └─ char count ─ StandardScaler ──┘
//! ```
//!
//! Every stage implements [`Transformer`]; [`FeatureUnion`] composes them in a
//! fixed order.

pub mod matrix;
pub mod scalar;
pub mod tfidf;
pub mod transformer;
pub mod union;
pub mod vocabulary;

pub use matrix::FeatureMatrix;
pub use scalar::{ScalarFeature, ScalarKind, StandardScaler};
pub use tfidf::{CountVectorizer, TfidfVectorizer};
pub use transformer::{Corpus, InputKind, Transformer};
pub use union::{FeatureConfig, FeatureStage, FeatureUnion};
pub use vocabulary::Vocabulary;
