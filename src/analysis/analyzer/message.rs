//! Message analyzer: the normalization chain applied to every relief message.
//!
//! Steps, in order:
//!
//! 1. split into word-level tokens ([`WordTokenizer`])
//! 2. drop stop words ([`StopFilter`], case policy from [`AnalyzerConfig`])
//! 3. lowercase and trim ([`LowercaseFilter`])
//! 4. reduce verbs to their base form ([`LemmaFilter`])
//! 5. drop punctuation/symbol-only tokens ([`PunctuationFilter`])
//! 6. drop tokens containing a digit ([`DigitFilter`])
//!
//! The analyzer is serialized through its [`AnalyzerConfig`], so a loaded
//! model rebuilds exactly the chain it was trained with.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::digit::DigitFilter;
use crate::analysis::token_filter::lemma::LemmaFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::punctuation::{PunctuationFilter, PunctuationMode};
use crate::analysis::token_filter::stop::{StopFilter, StopwordCase};
use crate::analysis::tokenizer::word::WordTokenizer;
use crate::error::Result;

/// Settings for the message normalization chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// How stop words are matched.
    pub stopword_case: StopwordCase,
    /// Which tokens count as punctuation.
    pub punctuation: PunctuationMode,
    /// Whether English clitics are split from their host word.
    pub split_clitics: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            stopword_case: StopwordCase::Sensitive,
            punctuation: PunctuationMode::Entire,
            split_clitics: true,
        }
    }
}

/// Analyzer producing the cleaned token sequence of a message.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "AnalyzerConfig", into = "AnalyzerConfig")]
pub struct MessageAnalyzer {
    config: AnalyzerConfig,
    inner: PipelineAnalyzer,
}

impl MessageAnalyzer {
    /// Create a message analyzer with the default settings.
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create a message analyzer from explicit settings.
    pub fn with_config(config: AnalyzerConfig) -> Self {
        let tokenizer = WordTokenizer::new().with_clitic_splitting(config.split_clitics);
        let inner = PipelineAnalyzer::new(Arc::new(tokenizer))
            .add_filter(Arc::new(StopFilter::new().with_case(config.stopword_case)))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(LemmaFilter::new()))
            .add_filter(Arc::new(
                PunctuationFilter::new().with_mode(config.punctuation),
            ))
            .add_filter(Arc::new(DigitFilter::new()))
            .with_name("message");

        MessageAnalyzer { config, inner }
    }

    /// Get the settings this analyzer was built from.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a text and collect the token texts.
    pub fn tokens(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|token| token.text).collect())
    }
}

impl Default for MessageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<AnalyzerConfig> for MessageAnalyzer {
    fn from(config: AnalyzerConfig) -> Self {
        Self::with_config(config)
    }
}

impl From<MessageAnalyzer> for AnalyzerConfig {
    fn from(analyzer: MessageAnalyzer) -> Self {
        analyzer.config
    }
}

impl PartialEq for MessageAnalyzer {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl Analyzer for MessageAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "message"
    }
}

impl std::fmt::Debug for MessageAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAnalyzer")
            .field("config", &self.config)
            .field("inner", &self.inner)
            .finish()
    }
}
