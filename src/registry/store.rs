//! Directory-backed named model store

use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::format::ArtifactFormat;
use crate::learner::Learner;
use crate::{Error, Result};

/// Serialized envelope around a model.
#[derive(Serialize, Deserialize)]
struct Artifact<L> {
    name: String,
    model: L,
}

/// One file per named model under a root directory.
///
/// A name maps to at most one artifact: `<root>/<name>.<extension>`. Saves
/// go through a temporary file in the same directory and are renamed into
/// place, so a failed write leaves the previous artifact intact. There is
/// no locking; concurrent writers to the same name race and the last
/// rename wins.
#[derive(Debug, Clone)]
pub struct ModelRegistry<L> {
    root: PathBuf,
    format: ArtifactFormat,
    _model: PhantomData<fn() -> L>,
}

impl<L: Learner> ModelRegistry<L> {
    /// Open (creating if needed) a registry directory.
    pub fn open(root: impl Into<PathBuf>, format: ArtifactFormat) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| Error::storage(format!("creating registry {}", root.display()), e))?;
        Ok(Self {
            root,
            format,
            _model: PhantomData,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// Artifact path for `name`. Names are a single path component of
    /// ASCII letters, digits, `_` and `-`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}.{}", self.format.extension())))
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Load a model; `NotFound` if no artifact exists under `name`.
    pub fn load(&self, name: &str) -> Result<L> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound { name: name.into() })
            }
            Err(e) => return Err(Error::storage(format!("reading {}", path.display()), e)),
        };
        let artifact: Artifact<L> = self.format.decode(&bytes)?;
        if artifact.name != name {
            debug!(stored = %artifact.name, requested = name, "artifact was renamed on disk");
        }
        Ok(artifact.model)
    }

    /// Write or overwrite the artifact for `name`.
    pub fn save(&self, model: &L, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        let bytes = self.format.encode(&Artifact {
            name: name.to_string(),
            model,
        })?;
        let mut tmp = NamedTempFile::new_in(&self.root)
            .map_err(|e| Error::storage(format!("staging {}", path.display()), e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| Error::storage(format!("writing {}", path.display()), e))?;
        tmp.persist(&path)
            .map_err(|e| Error::storage(format!("replacing {}", path.display()), e.error))?;
        info!(model = name, bytes = bytes.len(), "model saved");
        Ok(())
    }

    /// Remove the artifact; `NotFound` if absent.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(model = name, "model deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound { name: name.into() })
            }
            Err(e) => Err(Error::storage(format!("deleting {}", path.display()), e)),
        }
    }

    /// Independent deep copy of a stored model. Nothing is written.
    pub fn clone_model(&self, source: &str) -> Result<L> {
        self.load(source)
    }

    /// Copy `source` to a new name. Fails if `target` already exists.
    pub fn duplicate(&self, source: &str, target: &str) -> Result<L> {
        if self.contains(target)? {
            return Err(Error::Validation(format!("model '{target}' already exists")));
        }
        let model = self.clone_model(source)?;
        self.save(&model, target)?;
        Ok(model)
    }

    /// Stored model names, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| Error::storage(format!("listing {}", self.root.display()), e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| Error::storage(format!("listing {}", self.root.display()), e))?
                .path();
            if !path.is_file() {
                continue;
            }
            let matches_ext = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == self.format.extension());
            let stem = path.file_stem().and_then(|s| s.to_str());
            if let (true, Some(stem)) = (matches_ext, stem) {
                if validate_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "invalid model name '{name}': use letters, digits, '_' or '-'"
        )))
    }
}
