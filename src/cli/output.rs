//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{OutputFormat, VerityArgs};
use crate::detect::{CheckResponse, Verdict};
use crate::error::Result;
use crate::ml::Label;
use crate::ml::artifact::ModelManifest;
use crate::ml::training::TrainingReport;

/// Result structure for model inspection.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub path: String,
    pub classifier: String,
    pub vocabulary_size: usize,
    pub min_token_length: usize,
    pub supports_confidence: bool,
    pub manifest: Option<ModelManifest>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &VerityArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    for line in format_generic_human(&value) {
        println!("{line}");
    }
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &VerityArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Print a check response.
pub fn output_check(response: &CheckResponse, args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(response, args),
        OutputFormat::Human => {
            for line in format_check_human(response) {
                println!("{line}");
            }
            Ok(())
        }
    }
}

/// Print a training report.
pub fn output_training(report: &TrainingReport, args: &VerityArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(report, args),
        OutputFormat::Human => {
            println!("Model {} trained", report.model_id);
            println!("Classifier: {}", report.family);
            println!("Seed: {}", report.seed);
            println!(
                "Documents: {} training, {} held out",
                report.train_size, report.test_size
            );
            println!("Vocabulary: {} terms", report.vocabulary_size);
            match &report.metrics {
                Some(metrics) => {
                    println!("Held-out accuracy: {:.4}", metrics.accuracy);
                    if args.verbosity() > 1 {
                        println!("Precision (REAL): {:.4}", metrics.precision);
                        println!("Recall (REAL): {:.4}", metrics.recall);
                        println!("F1 (REAL): {:.4}", metrics.f1);
                    }
                }
                None => println!("Held-out accuracy: n/a (no held-out split)"),
            }
            Ok(())
        }
    }
}

fn label_text(label: Label) -> &'static str {
    match label {
        Label::Real => "Real News",
        Label::Fake => "Fake News",
    }
}

/// Lines describing a check response for a terminal.
pub fn format_check_human(response: &CheckResponse) -> Vec<String> {
    let mut lines = Vec::new();
    match response {
        CheckResponse::Ok { verdict, extracted } => {
            if let Some(article) = extracted {
                lines.push("Extracted Article:".to_string());
                if !article.title.is_empty() {
                    lines.push(article.title.clone());
                }
                lines.push(article.excerpt.clone());
                lines.push(String::new());
            }

            lines.push("Result:".to_string());
            lines.push(label_text(verdict.label()).to_string());
            lines.push(format!("Reason: {}", verdict.reason()));
            if verdict.is_overridden() {
                lines.push(format!("Model prediction: {}", label_text(verdict.model_label())));
            }
            if let Some(confidence) = verdict.confidence() {
                lines.push(format!("Confidence: {confidence:.2}"));
            }
            if let Some(fact_check) = &verdict.signals().fact_check {
                lines.push(format!(
                    "Fact-check: \"{}\" rated {}",
                    fact_check.review.claim_text, fact_check.review.textual_rating
                ));
            }
        }
        CheckResponse::Error { kind, message } => {
            if kind.is_extraction() {
                lines.push("Could not extract or analyze the article.".to_string());
                lines.push(format!("Details: {message}"));
            } else {
                lines.push(format!("Warning: {message}"));
            }
        }
    }
    lines
}

/// Lines for an arbitrary serializable value.
fn format_generic_human(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Object(obj) => obj
            .iter()
            .map(|(key, val)| format!("{key}: {}", format_value(val)))
            .collect(),
        _ => vec![format_value(value)],
    }
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        serde_json::Value::Object(obj) => {
            let formatted_values = obj
                .iter()
                .map(|(k, v)| format!("{k}={}", format_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{formatted_values}}}")
        }
        serde_json::Value::Null => "null".to_string(),
    }
}
