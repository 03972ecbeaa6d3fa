//! Command-line interface types

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ensenar: curriculum, k-fold and machine-teaching training for a
/// diphthong/hiatus word classifier
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ensenar")]
#[command(version)]
#[command(about = "Train, teach and evaluate diphthong/hiatus word classifiers")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to YAML configuration file
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train the catalog models that are not stored yet
    Bootstrap,

    /// Retrain all eight catalog models
    Reset,

    /// List stored models
    List,

    /// Create a model by copying an existing one
    Create(CreateArgs),

    /// Delete a stored model
    Delete(NameArgs),

    /// Fine-tune a model on newly labeled words
    Teach(TeachArgs),

    /// Predict the class of one word
    Predict(PredictArgs),

    /// Evaluate models on the held-out set
    Evaluate(EvaluateArgs),

    /// Print a model's confusion matrix on the held-out set
    Matrix(NameArgs),

    /// Print a model's latest training history
    History(NameArgs),
}

/// A single model name
#[derive(Args, Debug, Clone, PartialEq)]
pub struct NameArgs {
    /// Model name
    pub name: String,
}

/// Arguments for the create command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct CreateArgs {
    /// New model name
    pub name: String,

    /// Model to copy (defaults to curriculum_under_trained)
    #[arg(long)]
    pub from: Option<String>,
}

/// Arguments for the teach command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct TeachArgs {
    /// Model to update
    pub name: String,

    /// JSON object mapping words to labels (d, h or g)
    #[arg(long, value_name = "FILE", conflicts_with = "word", required_unless_present = "word")]
    pub batch: Option<PathBuf>,

    /// A labeled word, e.g. --word baúl=h (repeatable)
    #[arg(long, value_name = "WORD=LABEL")]
    pub word: Vec<String>,
}

/// Arguments for the predict command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct PredictArgs {
    /// Model name
    pub name: String,

    /// Word to classify
    pub word: String,
}

/// Arguments for the evaluate command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Models to evaluate (all stored models when omitted)
    pub names: Vec<String>,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
