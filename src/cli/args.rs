//! Command line argument parsing for the triage binaries using clap.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Args, CommandFactory, Parser, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::search::metrics::Metric;

/// Flags shared by every binary.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format. With `json` the evaluation table is not printed; pass
    /// `--report FILE` to get it as JSON.
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl GlobalArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n + 1,
            }
        }
    }

    /// Whether the human-readable evaluation table goes to stdout.
    pub fn shows_report(&self) -> bool {
        self.output_format == OutputFormat::Human && self.verbosity() > 0
    }

    /// Log level matching the verbosity.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity() {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Printed with the usage line when `triage-train` gets the wrong number of
/// positional arguments.
pub const TRAIN_GUIDANCE: &str = "Please provide the path of the disaster messages database as the \
first argument and the path to save the trained model to as the second argument.

Example: triage-train data/DisasterResponse.db classifier.bin";

/// Result of reading the `triage-train` command line.
#[derive(Debug, Clone)]
pub enum TrainInvocation {
    /// Both positionals present; run the training.
    Run(TrainArgs),
    /// Wrong positional count. Print this text and exit successfully.
    Usage(String),
}

/// Train a multi-label message classifier and save it
#[derive(Parser, Debug, Clone)]
#[command(name = "triage-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a multi-label classifier for disaster-response messages")]
#[command(long_about = None)]
pub struct TrainArgs {
    /// Dataset file (SQLite database or CSV)
    #[arg(value_name = "DATABASE")]
    pub dataset: PathBuf,

    /// Output path of the trained model
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// JSON training configuration
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fraction of messages held out for evaluation
    #[arg(long, value_name = "FRACTION")]
    pub test_size: Option<f64>,

    /// Seed of the train/test shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,

    /// Metric used to pick the best configuration
    #[arg(long, value_name = "METRIC")]
    pub refit_metric: Option<Metric>,

    /// Table to read from a SQLite dataset (defaults to the file stem)
    #[arg(long, env = "TRIAGE_TABLE")]
    pub table: Option<String>,

    /// Upper bound on search worker threads
    #[arg(long, env = "TRIAGE_THREADS")]
    pub threads: Option<usize>,

    /// Write the evaluation report as JSON to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

impl TrainArgs {
    /// Parse `args`, turning a wrong positional count into
    /// [`TrainInvocation::Usage`]. Help, version and malformed options stay
    /// clap errors.
    pub fn parse_invocation<I, T>(args: I) -> std::result::Result<TrainInvocation, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(args) => Ok(TrainInvocation::Run(args)),
            Err(err) if is_positional_count_error(&err) => Ok(TrainInvocation::Usage(train_usage())),
            Err(err) => Err(err),
        }
    }

    /// The configuration file (or the defaults) with command line overrides
    /// applied.
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(folds) = self.folds {
            config.folds = folds;
        }
        if let Some(metric) = self.refit_metric {
            config.refit_metric = metric;
        }
        if let Some(table) = &self.table {
            config.table = Some(table.clone());
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Guidance followed by the rendered usage line.
pub fn train_usage() -> String {
    format!("{TRAIN_GUIDANCE}\n\n{}", TrainArgs::command().render_usage())
}

fn is_positional_count_error(err: &clap::Error) -> bool {
    match err.kind() {
        ErrorKind::MissingRequiredArgument => true,
        // An extra positional is reported as unexpected; unknown flags are not
        // a count problem.
        ErrorKind::UnknownArgument => match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(arg)) => !arg.starts_with('-'),
            _ => true,
        },
        _ => false,
    }
}

/// Predict the categories of messages with a trained model
#[derive(Parser, Debug, Clone)]
#[command(name = "triage-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify messages with a trained triage model")]
pub struct PredictArgs {
    /// Trained model file
    #[arg(value_name = "MODEL")]
    pub model: PathBuf,

    /// Messages to classify. Read one per line from stdin when omitted.
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Only list the categories predicted positive
    #[arg(long)]
    pub positives: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let args = TrainArgs::try_parse_from(["triage-train", "data.db", "model.bin"]).unwrap();
        assert_eq!(args.dataset, PathBuf::from("data.db"));
        assert_eq!(args.model, PathBuf::from("model.bin"));
        assert_eq!(args.global.verbosity(), 1);
        assert_eq!(args.global.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(TrainArgs::try_parse_from(["triage-train", "data.db"]).is_err());
        assert!(TrainArgs::try_parse_from(["triage-train", "a", "b", "c"]).is_err());
    }

    #[test]
    fn test_wrong_argument_count_is_soft() {
        let invocations: [&[&str]; 3] = [
            &["triage-train"],
            &["triage-train", "data.db"],
            &["triage-train", "data.db", "model.bin", "extra"],
        ];

        for argv in invocations {
            match TrainArgs::parse_invocation(argv.iter().copied()) {
                Ok(TrainInvocation::Usage(text)) => {
                    assert!(text.starts_with(TRAIN_GUIDANCE));
                    assert!(text.contains("triage-train"));
                }
                other => panic!("expected usage for {argv:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invocation_runs_or_fails_hard() {
        let run = TrainArgs::parse_invocation(["triage-train", "data.db", "model.bin"]).unwrap();
        assert!(matches!(run, TrainInvocation::Run(args) if args.model == PathBuf::from("model.bin")));

        let err =
            TrainArgs::parse_invocation(["triage-train", "data.db", "model.bin", "--bogus"])
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);

        let err = TrainArgs::parse_invocation(["triage-train", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = TrainArgs::parse_invocation(["triage-train", "a", "b", "--folds", "x"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_report_table_only_for_human_output() {
        let args = |extra: &[&str]| {
            let mut argv = vec!["triage-train", "data.db", "model.bin"];
            argv.extend_from_slice(extra);
            TrainArgs::try_parse_from(argv).unwrap().global
        };

        assert!(args(&[]).shows_report());
        assert!(!args(&["--format", "json"]).shows_report());
        assert!(!args(&["-q"]).shows_report());
    }

    #[test]
    fn test_overrides() {
        let args = TrainArgs::try_parse_from([
            "triage-train",
            "data.db",
            "model.bin",
            "--folds",
            "3",
            "--seed",
            "7",
            "--refit-metric",
            "recall",
            "-vv",
        ])
        .unwrap();

        let config = args.training_config().unwrap();
        assert_eq!(config.folds, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.refit_metric, Metric::Recall);
        assert_eq!(config.test_size, 0.3);
        assert_eq!(args.global.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_override() {
        let args = TrainArgs::try_parse_from([
            "triage-train",
            "data.db",
            "model.bin",
            "--test-size",
            "2",
        ])
        .unwrap();
        assert!(args.training_config().is_err());
    }

    #[test]
    fn test_quiet_wins() {
        let args =
            PredictArgs::try_parse_from(["triage-predict", "m.bin", "need water", "-q", "-v"])
                .unwrap();
        assert_eq!(args.global.verbosity(), 0);
        assert_eq!(args.texts, vec!["need water"]);
    }
}
