//! Command implementations for the Verity CLI.

use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::DetectorConfig;
use crate::detect::{CheckRequest, CheckResponse, DetectorService, ErrorKind};
use crate::error::{Result, VerityError};
use crate::ml::classifier::Classifier;
use crate::ml::model::{ModelHandle, NewsModel};
use crate::ml::training::{TrainingOptions, TrainingPipeline};

/// Execute a CLI command.
pub fn execute_command(args: VerityArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train_model(train_args.clone(), &args),
        Command::Check(check_args) => check_news(check_args.clone(), &args),
        Command::Inspect(inspect_args) => inspect_model(inspect_args.clone(), &args),
    }
}

/// Train a model and write its artifacts.
fn train_model(args: TrainArgs, cli_args: &VerityArgs) -> Result<()> {
    let config = DetectorConfig::load(args.config.as_deref())?;
    let min_token_length = args.min_token_length.unwrap_or(config.min_token_length);
    info!("Training with minimum token length {min_token_length}");

    let options = TrainingOptions {
        seed: args.seed,
        test_fraction: args.test_fraction,
        include_title: args.include_title,
        min_token_length,
        max_features: Some(args.max_features),
        max_df: args.max_df,
        family: args.classifier.into(),
        max_iter: args.max_iter,
    };
    let pipeline = TrainingPipeline::new(options)?;

    let start_time = Instant::now();
    let report = pipeline.run(&args.fake, &args.real, &args.out)?;
    info!(
        "Training finished in {} ms; artifacts written to {}",
        start_time.elapsed().as_millis(),
        args.out.display()
    );

    output_training(&report, cli_args)
}

/// Classify text or a URL with a trained model.
fn check_news(args: CheckArgs, cli_args: &VerityArgs) -> Result<()> {
    let config = DetectorConfig::load(args.config.as_deref())?;
    let model = NewsModel::load(&args.model)?;
    let service = DetectorService::from_config(ModelHandle::new(model), &config)?;

    let request = match (args.input.text, args.input.url) {
        (Some(text), None) => CheckRequest::text(text),
        (None, Some(url)) => CheckRequest::url(url),
        _ => {
            return Err(VerityError::config(
                "Provide exactly one of --text or --url",
            ));
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let response = runtime.block_on(service.check(request));

    output_check(&response, cli_args)?;

    match response {
        CheckResponse::Ok { .. } => Ok(()),
        CheckResponse::Error { kind, message } => match kind {
            ErrorKind::Validation => Err(VerityError::validation(message)),
            _ => Err(VerityError::other(format!("{kind:?}: {message}"))),
        },
    }
}

/// Describe a trained model.
fn inspect_model(args: InspectArgs, cli_args: &VerityArgs) -> Result<()> {
    let model = NewsModel::load(&args.model)?;

    output_result(
        "Model loaded successfully",
        &ModelInfo {
            path: args.model.to_string_lossy().to_string(),
            classifier: model.classifier().name().to_string(),
            vocabulary_size: model.dimension(),
            min_token_length: model.analyzer().config().min_token_length,
            supports_confidence: model.supports_confidence(),
            manifest: model.manifest().cloned(),
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn write_corpora(dir: &std::path::Path) {
        fs::write(
            dir.join("Fake.csv"),
            "title,text\n\
             A,Aliens secretly control the government says insider\n\
             B,Miracle cure hidden by doctors share before deleted\n\
             C,Shocking secret plot revealed by anonymous blogger\n",
        )
        .unwrap();
        fs::write(
            dir.join("True.csv"),
            "title,text\n\
             D,Parliament passes annual budget after lengthy debate\n\
             E,Central bank holds interest rates steady this quarter\n\
             F,Finance ministry publishes quarterly budget figures\n",
        )
        .unwrap();
    }

    #[test]
    fn test_train_then_inspect() {
        let dir = TempDir::new().unwrap();
        write_corpora(dir.path());
        let out = dir.path().join("model");

        let args = VerityArgs::try_parse_from([
            "verity".to_string(),
            "-q".to_string(),
            "train".to_string(),
            "--fake".to_string(),
            dir.path().join("Fake.csv").display().to_string(),
            "--real".to_string(),
            dir.path().join("True.csv").display().to_string(),
            "--out".to_string(),
            out.display().to_string(),
            "--seed".to_string(),
            "5".to_string(),
        ])
        .unwrap();
        execute_command(args).unwrap();
        assert!(out.join("vectorizer.bin").exists());
        assert!(out.join("classifier.bin").exists());
        assert!(out.join("model.json").exists());

        let args = VerityArgs::try_parse_from([
            "verity".to_string(),
            "-q".to_string(),
            "inspect".to_string(),
            "--model".to_string(),
            out.display().to_string(),
        ])
        .unwrap();
        execute_command(args).unwrap();
    }

    fn train_args(dir: &std::path::Path, out: &std::path::Path, extra: &[String]) -> VerityArgs {
        let mut argv = vec![
            "verity".to_string(),
            "-q".to_string(),
            "train".to_string(),
            "--fake".to_string(),
            dir.join("Fake.csv").display().to_string(),
            "--real".to_string(),
            dir.join("True.csv").display().to_string(),
            "--out".to_string(),
            out.display().to_string(),
            "--seed".to_string(),
            "5".to_string(),
        ];
        argv.extend_from_slice(extra);
        VerityArgs::try_parse_from(argv).unwrap()
    }

    fn trained_min_token_length(out: &std::path::Path) -> usize {
        NewsModel::load(out).unwrap().analyzer().config().min_token_length
    }

    #[test]
    fn test_train_takes_token_length_from_config() {
        let dir = TempDir::new().unwrap();
        write_corpora(dir.path());

        let out = dir.path().join("default");
        execute_command(train_args(dir.path(), &out, &[])).unwrap();
        assert_eq!(
            trained_min_token_length(&out),
            DetectorConfig::default().min_token_length
        );

        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{ "min_token_length": 3 }"#).unwrap();
        let out = dir.path().join("configured");
        let extra = ["--config".to_string(), config_path.display().to_string()];
        execute_command(train_args(dir.path(), &out, &extra)).unwrap();
        assert_eq!(trained_min_token_length(&out), 3);

        let out = dir.path().join("flag");
        let extra = [
            "--config".to_string(),
            config_path.display().to_string(),
            "--min-token-length".to_string(),
            "0".to_string(),
        ];
        execute_command(train_args(dir.path(), &out, &extra)).unwrap();
        assert_eq!(trained_min_token_length(&out), 0);
    }

    #[test]
    fn test_check_short_text_fails_validation() {
        let dir = TempDir::new().unwrap();
        write_corpora(dir.path());
        let out = dir.path().join("model");
        TrainingPipeline::new(TrainingOptions {
            seed: Some(1),
            ..Default::default()
        })
        .unwrap()
        .run(dir.path().join("Fake.csv"), dir.path().join("True.csv"), out.clone())
        .unwrap();

        let args = VerityArgs::try_parse_from([
            "verity".to_string(),
            "-q".to_string(),
            "check".to_string(),
            "--model".to_string(),
            out.display().to_string(),
            "--text".to_string(),
            "xyz qqq zzz".to_string(),
        ])
        .unwrap();
        let err = execute_command(args).unwrap_err();
        assert!(matches!(err, VerityError::Validation(_)));
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let dir = TempDir::new().unwrap();
        let args = VerityArgs::try_parse_from([
            "verity".to_string(),
            "inspect".to_string(),
            "--model".to_string(),
            dir.path().join("nope").display().to_string(),
        ])
        .unwrap();
        assert!(execute_command(args).is_err());
    }
}
