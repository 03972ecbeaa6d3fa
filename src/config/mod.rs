//! Configuration: YAML application settings and the CLI definition

mod cli;
mod loader;
mod schema;
mod validate;

pub use cli::{
    parse_args, Cli, Command, CreateArgs, EvaluateArgs, NameArgs, PredictArgs, TeachArgs,
};
pub use loader::{load_config, load_or_default};
pub use schema::{AppConfig, CorpusConfig, EncodingConfig, RegistryConfig, TrainingConfig};
