//! The eight-model catalog and its bootstrap

mod catalog;
mod orchestrator;

pub use catalog::{
    Budget, Catalog, CatalogEntry, CatalogSettings, Regime, ValidationMode, VariantKey,
};
pub use orchestrator::{BootstrapOrchestrator, BootstrapReport};
