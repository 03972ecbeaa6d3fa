//! Named model persistence

mod format;
mod store;

pub use format::ArtifactFormat;
pub use store::ModelRegistry;
