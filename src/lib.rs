//! # Ensenar
//!
//! Training strategies and model lifecycle for a small word classifier that
//! tells Spanish diphthongs, hiatuses and neither apart.
//!
//! - Difficulty-tier staging of a labeled corpus ([`corpus`])
//! - Curriculum, stratified k-fold and plain training ([`train`])
//! - Post-deployment teaching with a reduced learning rate
//! - A named model registry with atomic saves ([`registry`])
//! - Bootstrap of an eight-model catalog ([`bootstrap`])
//! - Evaluation, confusion matrices and single-word prediction ([`eval`])
//!
//! # Example
//!
//! ```no_run
//! use ensenar::config::AppConfig;
//! use ensenar::learner::SequenceClassifier;
//! use ensenar::session::Session;
//!
//! let config = AppConfig::default();
//! let session = Session::<SequenceClassifier>::open(&config)?;
//! let prediction = session.predict("max", "baúl")?;
//! println!("{:?}", prediction.class);
//! # Ok::<(), ensenar::Error>(())
//! ```

mod error;

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod eval;
pub mod history;
pub mod learner;
pub mod registry;
pub mod search;
pub mod session;
pub mod tokenizer;
pub mod train;

pub use error::{Error, Result};
