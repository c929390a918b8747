//! Embed minified bookmarklet sources into the manifest.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::app::minify::minify;
use crate::domain::model::Manifest;

/// What happened to one descriptor during enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichOutcome {
    Embedded { name: String, file: String },
    MissingFileField { name: String },
    SourceNotFound { name: String, file: String },
    Failed { name: String, file: String, reason: String },
}

impl EnrichOutcome {
    pub fn is_embedded(&self) -> bool {
        matches!(self, EnrichOutcome::Embedded { .. })
    }
}

impl fmt::Display for EnrichOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichOutcome::Embedded { name, file } => {
                write!(f, "[OK] Embedded code for: {name} ({file})")
            }
            EnrichOutcome::MissingFileField { name } => {
                write!(f, "[WARN] Bookmarklet '{name}' has no file specified")
            }
            EnrichOutcome::SourceNotFound { name, file } => {
                write!(f, "[WARN] File {file} not found for '{name}'")
            }
            EnrichOutcome::Failed { name, file, reason } => {
                write!(f, "[FAIL] Failed to read code for: {name} ({file}): {reason}")
            }
        }
    }
}

/// Per-descriptor outcomes, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    pub outcomes: Vec<EnrichOutcome>,
}

impl EnrichReport {
    pub fn embedded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_embedded())
            .count()
    }
}

/// Refresh `code` on every descriptor whose source can be read from `source_dir`.
///
/// Never fails as a whole; problems are recorded per descriptor and the caller decides
/// whether the run is usable.
pub fn enrich_manifest(manifest: &mut Manifest, source_dir: &Path) -> EnrichReport {
    let mut report = EnrichReport::default();

    for bookmarklet in &mut manifest.bookmarklets {
        let name = bookmarklet.display_name().to_owned();
        let Some(file) = bookmarklet.file().map(str::to_owned) else {
            report.outcomes.push(EnrichOutcome::MissingFileField { name });
            continue;
        };

        let path = source_dir.join(&file);
        if !path.exists() {
            report
                .outcomes
                .push(EnrichOutcome::SourceNotFound { name, file });
            continue;
        }

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                report.outcomes.push(EnrichOutcome::Failed {
                    name,
                    file,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let code = minify(&source);
        if code.is_empty() {
            report.outcomes.push(EnrichOutcome::Failed {
                name,
                file,
                reason: "source is empty after minification".into(),
            });
            continue;
        }

        tracing::debug!(
            file = %path.display(),
            source_bytes = source.len(),
            code_bytes = code.len(),
            "embedded bookmarklet"
        );
        bookmarklet.set_code(code);
        report.outcomes.push(EnrichOutcome::Embedded { name, file });
    }

    report
}
