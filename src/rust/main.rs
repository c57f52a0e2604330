use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chat_responder::{ArtifactNames, ArtifactStore, TrainingConfig, TrainingPipeline, TrainingSummary};
use clap::{Args, Parser, Subcommand};
use log::info;

/// Training flags are accepted with or without the `train` subcommand.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    train: TrainArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train, evaluate and persist the response classifier (default)
    Train(TrainArgs),
    /// Predict a response for one message using persisted artifacts
    Predict {
        /// The message to answer
        message: String,
        /// Directory holding the persisted artifacts
        #[arg(long, default_value = ".")]
        model_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// CSV file with `message` and `response` columns
    #[arg(long, default_value = "chat_data.csv")]
    data: PathBuf,
    /// Where the vectorizer and classifier artifacts are written
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Fraction of records held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Maximum vocabulary size
    #[arg(long, default_value_t = 500)]
    max_features: usize,
    /// Additive smoothing for naive Bayes
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,
    /// Field delimiter of the input file
    #[arg(long, default_value_t = ',')]
    delimiter: char,
    /// Message predicted once after training as a sanity check
    #[arg(long, default_value = "Hello")]
    sanity_message: String,
}

impl TrainArgs {
    fn into_config(self) -> Result<TrainingConfig> {
        if !self.delimiter.is_ascii() {
            bail!("Delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(TrainingConfig {
            data_path: self.data,
            delimiter: self.delimiter as u8,
            output_dir: self.output_dir,
            artifact_names: ArtifactNames::default(),
            test_size: self.test_size,
            random_state: self.seed,
            max_features: self.max_features,
            alpha: self.alpha,
            sanity_message: self.sanity_message,
            ..TrainingConfig::default()
        })
    }
}

/// Console report printed after a training run
fn render_summary(summary: &TrainingSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model Accuracy: {:.2}%", summary.accuracy * 100.0);
    let _ = writeln!(out, "Classification Report:");
    let _ = writeln!(out, "{}", summary.report);
    let _ = writeln!(out, "Model and Vectorizer saved!");
    let _ = writeln!(out, "Test Message: {}", summary.sanity.message);
    let _ = writeln!(out, "Predicted Response: {}", summary.sanity.predicted);
    out
}

/// Console output of `predict`, scores highest first
fn render_prediction(response: &str, scores: HashMap<String, f64>) -> String {
    let mut scores: Vec<_> = scores.into_iter().collect();
    scores.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut out = String::new();
    let _ = writeln!(out, "Predicted Response: {}", response);
    let _ = writeln!(out, "Confidence scores (sorted):");
    for (label, score) in scores {
        let _ = writeln!(out, "    {}: {:.1}%", label, score * 100.0);
    }
    out
}

fn train(args: TrainArgs) -> Result<()> {
    let config = args.into_config()?;
    info!("=== Training response classifier ===");
    info!("Configuration: {:?}", config);

    let start_time = Instant::now();
    let summary = TrainingPipeline::new(config)
        .run()
        .context("Training run failed")?;

    print!("{}", render_summary(&summary));

    info!(
        "=== Done in {:.2?}: {} train / {} test records, {} features, {} classes ===",
        start_time.elapsed(),
        summary.n_train,
        summary.n_test,
        summary.vocabulary_size,
        summary.classes.len()
    );
    Ok(())
}

fn predict(message: &str, model_dir: PathBuf) -> Result<()> {
    let store = ArtifactStore::new(&model_dir)
        .with_context(|| format!("Cannot open artifact directory {:?}", model_dir))?;
    let predictor = store
        .load_predictor()
        .context("Failed to load persisted vectorizer and classifier")?;

    let (response, scores) = predictor
        .predict(message)
        .with_context(|| format!("Failed to predict a response for {:?}", message))?;

    print!("{}", render_prediction(&response, scores));
    Ok(())
}

fn main() -> Result<()> {
    chat_responder::init_logger();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Train(cli.train)) {
        Command::Train(args) => train(args),
        Command::Predict { message, model_dir } => predict(&message, model_dir),
    }
}
