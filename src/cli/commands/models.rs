//! Catalog and registry commands

use crate::bootstrap::BootstrapReport;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{AppConfig, CreateArgs, NameArgs};
use crate::learner::SequenceClassifier;
use crate::registry::ModelRegistry;
use crate::search::{HyperparameterSpace, RandomArchitectureSearch};
use crate::session::Session;
use crate::Result;

fn search(config: &AppConfig) -> Result<RandomArchitectureSearch> {
    RandomArchitectureSearch::new(
        HyperparameterSpace::classifier(),
        config.model.clone(),
        config.search.clone(),
        config.training.trainer_settings(),
    )
}

fn report(report: &BootstrapReport, level: LogLevel) {
    if report.is_noop() {
        log(level, LogLevel::Normal, "All catalog models are present");
        return;
    }
    log(level, LogLevel::Normal, &format!("Trained {} model(s):", report.trained.len()));
    for name in &report.trained {
        log(level, LogLevel::Normal, &format!("  {name}"));
    }
    for name in &report.skipped {
        log(level, LogLevel::Verbose, &format!("  kept {name}"));
    }
}

pub fn run_bootstrap(config: &AppConfig, level: LogLevel) -> Result<()> {
    let mut session = Session::<SequenceClassifier>::open(config)?;
    let outcome = session.bootstrap(search(config)?)?;
    report(&outcome, level);
    Ok(())
}

pub fn run_reset(config: &AppConfig, level: LogLevel) -> Result<()> {
    let mut session = Session::<SequenceClassifier>::open(config)?;
    let outcome = session.reset(search(config)?)?;
    report(&outcome, level);
    Ok(())
}

/// Lists the registry directly; the corpus is not needed.
pub fn run_list(config: &AppConfig, level: LogLevel) -> Result<()> {
    let registry = ModelRegistry::<SequenceClassifier>::open(&config.registry.dir, config.registry.format)?;
    let names = registry.list()?;
    if names.is_empty() {
        log(level, LogLevel::Normal, "No stored models. Run `ensenar bootstrap`.");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn run_create(config: &AppConfig, args: CreateArgs, level: LogLevel) -> Result<()> {
    let session = Session::<SequenceClassifier>::open(config)?;
    session.create(&args.name, args.from.as_deref())?;
    log(level, LogLevel::Normal, &format!("Created {}", args.name));
    Ok(())
}

pub fn run_delete(config: &AppConfig, args: NameArgs, level: LogLevel) -> Result<()> {
    let mut session = Session::<SequenceClassifier>::open(config)?;
    session.delete(&args.name)?;
    log(level, LogLevel::Normal, &format!("Deleted {}", args.name));
    Ok(())
}
