//! Analyzer implementations that combine tokenizers and filters.
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Feature Extractors
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 .. Filter N
//! ```

mod message;
mod pipeline;

pub use message::{AnalyzerConfig, MessageAnalyzer};
pub use pipeline::PipelineAnalyzer;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that turn raw text into a stream of tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and logging).
    fn name(&self) -> &'static str;
}
