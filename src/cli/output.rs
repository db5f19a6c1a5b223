//! Output formatting for CLI commands.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::cli::args::{GlobalArgs, OutputFormat};
use crate::error::Result;
use crate::evaluate::EvaluationReport;
use crate::pipeline::LabelVector;
use crate::train::TrainingSummary;

/// Prediction for one input message.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub text: String,
    pub labels: LabelVector,
}

/// Output a finished training run in the requested format.
pub fn output_training_summary(summary: &TrainingSummary, args: &GlobalArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                output_training_summary_human(summary);
            }
            Ok(())
        }
        OutputFormat::Json => output_json(summary, args),
    }
}

fn output_training_summary_human(summary: &TrainingSummary) {
    println!();
    println!("Training Summary:");
    println!("═════════════════");
    println!(
        "Messages: {} ({} train, {} test)",
        summary.examples, summary.train_examples, summary.test_examples
    );
    println!(
        "Categories: {} retained",
        summary.categories.retained.len()
    );
    if !summary.categories.excluded.is_empty() {
        println!(
            "Excluded (no variation): {}",
            summary.categories.excluded.join(", ")
        );
    }
    println!("Best parameters: {}", summary.metadata.config);
    println!(
        "Best cross-validated {}: {:.4}",
        summary.report.refit_metric, summary.metadata.cv_score
    );
    println!("Test accuracy: {:.4}", summary.report.accuracy);
    println!("Total time: {}", format_duration(summary.duration_secs));
}

/// Output predictions in the requested format.
pub fn output_predictions(
    predictions: &[Prediction],
    positives_only: bool,
    args: &GlobalArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            for prediction in predictions {
                println!("{}", prediction.text);
                if positives_only {
                    let positives = prediction.labels.positives();
                    if positives.is_empty() {
                        println!("  (none)");
                    } else {
                        println!("  {}", positives.join(", "));
                    }
                } else {
                    println!("  {}", prediction.labels);
                }
            }
            Ok(())
        }
        OutputFormat::Json => output_json(&predictions, args),
    }
}

/// Write an evaluation report as pretty JSON.
pub fn write_report<P: AsRef<Path>>(report: &EvaluationReport, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path.as_ref(), json)?;
    log::info!("wrote evaluation report to {}", path.as_ref().display());
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize + ?Sized>(result: &T, args: &GlobalArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format seconds as `1h 02m 03s`, `2m 05s` or `4.2s`.
fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }
    let total = secs.round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(4.24), "4.2s");
        assert_eq!(format_duration(125.0), "2m 05s");
        assert_eq!(format_duration(3723.0), "1h 02m 03s");
    }

    #[test]
    fn test_prediction_json() {
        let prediction = Prediction {
            text: "need water".to_string(),
            labels: LabelVector::new(vec![("water".into(), 1), ("food".into(), 0)]),
        };
        let json = serde_json::to_string(&prediction).unwrap();
        assert_eq!(json, r#"{"text":"need water","labels":{"water":1,"food":0}}"#);
    }
}
