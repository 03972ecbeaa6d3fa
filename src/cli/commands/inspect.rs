//! Read-only model commands: predict, evaluate, matrix, history

use crate::cli::logging::{log, print_json};
use crate::cli::LogLevel;
use crate::config::{AppConfig, EvaluateArgs, NameArgs, PredictArgs};
use crate::learner::SequenceClassifier;
use crate::session::Session;
use crate::Result;

pub fn run_predict(config: &AppConfig, args: PredictArgs) -> Result<()> {
    let session = Session::<SequenceClassifier>::open(config)?;
    let prediction = session.predict(&args.name, &args.word)?;
    print_json(&prediction)
}

pub fn run_evaluate(config: &AppConfig, args: EvaluateArgs) -> Result<()> {
    let session = Session::<SequenceClassifier>::open(config)?;
    let names = if args.names.is_empty() {
        session.list()?
    } else {
        args.names
    };
    let evaluations = session.evaluate(&names)?;
    print_json(&evaluations)
}

pub fn run_matrix(config: &AppConfig, args: NameArgs, level: LogLevel) -> Result<()> {
    let session = Session::<SequenceClassifier>::open(config)?;
    let matrix = session.confusion_matrix(&args.name)?;
    log(level, LogLevel::Normal, &format!("Confusion matrix for {}:", args.name));
    println!("{matrix}");
    log(level, LogLevel::Verbose, &format!("accuracy: {:.4}", matrix.accuracy()));
    Ok(())
}

pub fn run_history(config: &AppConfig, args: NameArgs) -> Result<()> {
    let session = Session::<SequenceClassifier>::open(config)?;
    print_json(session.history(&args.name)?)
}
