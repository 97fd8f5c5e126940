//! On-disk preset storage.
//!
//! Presets are named JSON snapshots of the overlay state, stored as
//! `<name>.json` under the preset directory. Names are validated against
//! path separators before touching the filesystem.

use serde_json::Value as JsonValue;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PresetError {
    #[error("invalid preset name")]
    InvalidName,
    #[error("preset already exists")]
    AlreadyExists,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct PresetStore {
    dir: PathBuf,
}

impl PresetStore {
    /// Open (and create if needed) the preset directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<PresetStore, PresetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(PresetStore { dir })
    }

    /// Sorted preset names, without the `.json` extension.
    pub fn list(&self) -> Result<Vec<String>, PresetError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Store a new preset. Refuses to overwrite an existing one.
    pub fn save(&self, name: &str, state: &JsonValue) -> Result<(), PresetError> {
        let path = self.path_for(name)?;
        if path.exists() {
            return Err(PresetError::AlreadyExists);
        }
        let pretty = serde_json::to_vec_pretty(state)?;
        fs::write(&path, pretty)?;
        Ok(())
    }

    /// Load a preset, or `None` when it does not exist.
    ///
    /// Presets stored as `{"state": {...}}` (an older layout) are unwrapped
    /// to the inner object.
    pub fn load(&self, name: &str) -> Result<Option<JsonValue>, PresetError> {
        let path = self.path_for(name)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut value: JsonValue = serde_json::from_slice(&bytes)?;
        if let Some(inner) = value.get_mut("state") {
            return Ok(Some(inner.take()));
        }
        Ok(Some(value))
    }

    /// Delete a preset. Deleting a missing preset is not an error.
    pub fn delete(&self, name: &str) -> Result<(), PresetError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, PresetError> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(PresetError::InvalidName);
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}
