//! # Verity
//!
//! Fake news detection with a TF-IDF linear classifier.
//!
//! ## Features
//!
//! - Deterministic text normalization shared by training and inference
//! - TF-IDF vectorization with a frozen vocabulary
//! - Passive-aggressive and logistic regression classifiers
//! - Trusted-domain, trusted-keyword and fact-check overrides
//! - Checksummed model artifacts
//!
//! ```no_run
//! use verity::config::DetectorConfig;
//! use verity::detect::{CheckRequest, DetectorService};
//! use verity::ml::{ModelHandle, NewsModel};
//!
//! # async fn run() -> verity::error::Result<()> {
//! let model = NewsModel::load("models")?;
//! let config = DetectorConfig::load(None)?;
//! let service = DetectorService::from_config(ModelHandle::new(model), &config)?;
//!
//! let response = service
//!     .check(CheckRequest::text("The president announced a new award for ISRO scientists today"))
//!     .await;
//! println!("{}", serde_json::to_string(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod factcheck;
pub mod fetch;
pub mod ml;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
