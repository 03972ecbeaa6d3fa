//! Teach command implementation

use std::fs;

use crate::cli::logging::{log, print_json};
use crate::cli::LogLevel;
use crate::config::{AppConfig, TeachArgs};
use crate::learner::SequenceClassifier;
use crate::session::Session;
use crate::train::TeachingBatch;
use crate::{Error, Result};

/// Build the batch from `--batch FILE` or repeated `--word WORD=LABEL`.
pub fn parse_batch(args: &TeachArgs) -> Result<TeachingBatch> {
    if let Some(path) = &args.batch {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::storage(format!("reading {}", path.display()), e))?;
        return TeachingBatch::from_json(&text);
    }
    let pairs = args
        .word
        .iter()
        .map(|entry| {
            entry.rsplit_once('=').ok_or_else(|| {
                Error::Validation(format!("expected WORD=LABEL, got '{entry}'"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    TeachingBatch::from_tags(pairs)
}

pub fn run_teach(config: &AppConfig, args: TeachArgs, level: LogLevel) -> Result<()> {
    let batch = parse_batch(&args)?;
    let mut session = Session::<SequenceClassifier>::open(config)?;
    let outcome = session.teach(&args.name, &batch)?;
    let mistakes = outcome.mistakes().count();
    log(
        level,
        LogLevel::Normal,
        &format!("Taught {} word(s) to {}, {mistakes} mispredicted", batch.len(), args.name),
    );
    print_json(&outcome.summary)
}
