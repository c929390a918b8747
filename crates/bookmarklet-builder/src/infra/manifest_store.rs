//! Whole-file persistence of `bookmarklets.json`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::errors::BuildError;
use crate::domain::model::Manifest;

/// Reads and writes the manifest at a fixed path.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Manifest> {
        if !self.path.is_file() {
            return Err(BuildError::ManifestNotFound(self.path.clone()).into());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read manifest at {}", self.path.display()))?;
        let manifest = serde_json::from_str(&data)
            .with_context(|| format!("invalid manifest data in {}", self.path.display()))?;
        Ok(manifest)
    }

    /// Write with two-space indentation, literal non-ASCII, and a trailing newline.
    pub fn save(&self, manifest: &Manifest) -> Result<()> {
        let mut data =
            serde_json::to_string_pretty(manifest).context("failed to serialize manifest")?;
        data.push('\n');
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write manifest to {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), "manifest written");
        Ok(())
    }
}
