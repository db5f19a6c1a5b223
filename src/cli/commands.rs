//! Command implementations for the triage binaries.

use std::io::{self, BufRead};

use crate::cli::args::{PredictArgs, TrainArgs};
use crate::cli::output::{Prediction, output_predictions, output_training_summary, write_report};
use crate::error::Result;
use crate::persist;
use crate::train::{Trainer, TrainingSummary};

/// Train, evaluate and save a model.
pub fn execute_train(args: &TrainArgs) -> Result<TrainingSummary> {
    let config = args.training_config()?;
    log::debug!("training configuration: {config:?}");

    let trainer = Trainer::new(config).with_print_report(args.global.shows_report());
    let summary = trainer.run(&args.dataset, &args.model)?;

    if let Some(path) = &args.report {
        write_report(&summary.report, path)?;
    }
    output_training_summary(&summary, &args.global)?;
    Ok(summary)
}

/// Classify messages given on the command line or on stdin.
pub fn execute_predict(args: &PredictArgs) -> Result<Vec<Prediction>> {
    let artifact = persist::load(&args.model)?;
    log::info!(
        "loaded model trained at {} on {} messages",
        artifact.metadata().trained_at,
        artifact.metadata().training_examples
    );

    let texts = if args.texts.is_empty() {
        read_lines(io::stdin().lock())?
    } else {
        args.texts.clone()
    };

    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let labels = artifact.predict_batch(&refs)?;
    let predictions: Vec<Prediction> = texts
        .into_iter()
        .zip(labels)
        .map(|(text, labels)| Prediction { text, labels })
        .collect();

    output_predictions(&predictions, args.positives, &args.global)?;
    Ok(predictions)
}

/// Non-empty trimmed lines of `reader`.
fn read_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_lines_skips_blank() {
        let input = "need water\n\n  send food  \n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["need water", "send food"]);
    }
}
