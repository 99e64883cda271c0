//! Command line argument parsing for the Verity CLI using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ml::classifier::ClassifierFamily;

/// Verity - fake news detection with a TF-IDF linear classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "verity")]
#[command(about = "Classify news text or articles as real or fake")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct VerityArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl VerityArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from labeled CSV corpora
    Train(TrainArgs),

    /// Classify news text or an article URL
    Check(CheckArgs),

    /// Show information about a trained model
    Inspect(InspectArgs),
}

/// Arguments for training a model
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file of fake news (needs a `text` column)
    #[arg(long, value_name = "CSV")]
    pub fake: PathBuf,

    /// CSV file of real news (needs a `text` column)
    #[arg(long, value_name = "CSV")]
    pub real: PathBuf,

    /// Directory to write the model artifacts into
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub out: PathBuf,

    /// Seed for shuffling and training; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Classifier family
    #[arg(short, long, default_value = "passive-aggressive")]
    pub classifier: ClassifierChoice,

    /// Vocabulary size cap
    #[arg(long, default_value = "5000")]
    pub max_features: usize,

    /// Ignore terms in more than this fraction of documents
    #[arg(long, default_value = "1.0")]
    pub max_df: f64,

    /// Drop tokens with at most this many characters (0 keeps all);
    /// defaults to `min_token_length` from the detector configuration
    #[arg(long)]
    pub min_token_length: Option<usize>,

    /// Fraction of the corpus held out for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_fraction: f64,

    /// Prepend the title column to the text
    #[arg(long)]
    pub include_title: bool,

    /// Maximum training epochs
    #[arg(long, default_value = "1000")]
    pub max_iter: usize,

    /// Detector configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Classifier families selectable on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierChoice {
    /// Passive-aggressive (no confidence scores)
    PassiveAggressive,
    /// Logistic regression (reports confidence)
    Logistic,
}

impl From<ClassifierChoice> for ClassifierFamily {
    fn from(choice: ClassifierChoice) -> Self {
        match choice {
            ClassifierChoice::PassiveAggressive => ClassifierFamily::PassiveAggressive,
            ClassifierChoice::Logistic => ClassifierFamily::Logistic,
        }
    }
}

/// Arguments for classifying input
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Directory containing the model artifacts
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model: PathBuf,

    #[command(flatten)]
    pub input: CheckInput,

    /// Detector configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// What to classify: exactly one of text or URL
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CheckInput {
    /// News text or headline
    #[arg(long)]
    pub text: Option<String>,

    /// Article URL
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for inspecting a model
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Directory containing the model artifacts
    #[arg(short, long, value_name = "MODEL_DIR")]
    pub model: PathBuf,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
