//! Fixed project layout: where the manifest, sources, and generated file live.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_LAYOUT: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-layout.toml"));

/// File names and identifiers the builder works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "BuildConfig::default_manifest_dir")]
    pub manifest_dir: String,
    #[serde(default = "BuildConfig::default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "BuildConfig::default_generated_file")]
    pub generated_file: String,
    #[serde(default = "BuildConfig::default_constant_name")]
    pub constant_name: String,
    #[serde(default = "BuildConfig::default_icon")]
    pub default_icon: String,
}

impl BuildConfig {
    fn default_manifest_dir() -> String {
        "bookmarklet".into()
    }

    fn default_manifest_file() -> String {
        "bookmarklets.json".into()
    }

    fn default_generated_file() -> String {
        "bookmarklets.js".into()
    }

    fn default_constant_name() -> String {
        "EMBEDDED_BOOKMARKLETS".into()
    }

    fn default_icon() -> String {
        "🔖".into()
    }

    /// Parse the layout bundled with the binary.
    pub fn load() -> Result<Self> {
        Self::parse(&DEFAULT_LAYOUT)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: BuildConfig =
            toml::from_str(contents).with_context(|| "failed to parse layout TOML".to_string())?;
        Ok(config)
    }

    /// Manifest location relative to the project root.
    pub fn manifest_relative_path(&self) -> PathBuf {
        Path::new(&self.manifest_dir).join(&self.manifest_file)
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            manifest_dir: Self::default_manifest_dir(),
            manifest_file: Self::default_manifest_file(),
            generated_file: Self::default_generated_file(),
            constant_name: Self::default_constant_name(),
            default_icon: Self::default_icon(),
        }
    }
}

/// A [`BuildConfig`] anchored at a project root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    config: BuildConfig,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Resolve the project root relative to the running executable.
    ///
    /// Walks up from the executable's directory, then from the working directory, looking for
    /// the manifest. Falls back to the executable's directory so the missing manifest is
    /// reported against it.
    pub fn discover() -> Result<Self> {
        let config = BuildConfig::load()?;
        let marker = config.manifest_relative_path();

        let exe = env::current_exe().context("unable to determine executable path")?;
        let exe_dir = exe.parent().map(Path::to_path_buf);
        let cwd = env::current_dir().context("unable to determine working directory")?;

        let root = exe_dir
            .iter()
            .chain(std::iter::once(&cwd))
            .find_map(|start| find_project_root(start, &marker))
            .or(exe_dir)
            .unwrap_or(cwd);

        tracing::debug!(root = %root.display(), "resolved project root");
        Ok(Self::new(root, config))
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Directory holding the manifest and the bookmarklet sources.
    pub fn manifest_dir(&self) -> PathBuf {
        self.root.join(&self.config.manifest_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_dir().join(&self.config.manifest_file)
    }

    pub fn generated_path(&self) -> PathBuf {
        self.root.join(&self.config.generated_file)
    }
}

fn find_project_root(start: &Path, marker: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(marker).is_file() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}
