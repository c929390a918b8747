//! Runs enrichment then sync, reporting progress to a writer.

use std::io::Write;

use anyhow::{Context, Result};

use crate::app::enrich::enrich_manifest;
use crate::app::sync::{SyncReport, sync_generated_source};
use crate::domain::errors::BuildError;
use crate::infra::config::Layout;
use crate::infra::manifest_store::ManifestStore;

const RULE_WIDTH: usize = 60;

/// Run both stages. Returns an error, after reporting it, if either stage fails.
pub fn run(layout: &Layout, out: &mut impl Write) -> Result<()> {
    let config = layout.config();
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{rule}\nBookmarklet Builder\n{rule}\n")?;

    writeln!(out, "Step 1: Embedding code into {}...", config.manifest_file)?;
    if let Err(err) = embed_stage(layout, out) {
        writeln!(out, "Failed to build {}", config.manifest_file)?;
        return Err(err.context(format!("failed to build {}", config.manifest_file)));
    }

    writeln!(
        out,
        "\nStep 2: Updating {} with embedded code...",
        config.generated_file
    )?;
    match sync_stage(layout) {
        Ok(report) => writeln!(
            out,
            "[OK] Successfully updated {} ({} bookmarklet(s))",
            report.path.display(),
            report.entries
        )?,
        Err(err) => {
            writeln!(out, "Failed to update {}", config.generated_file)?;
            return Err(err.context(format!("failed to update {}", config.generated_file)));
        }
    }

    writeln!(
        out,
        "\n{rule}\n[SUCCESS] Build complete! Bookmarklets are ready to use.\n{rule}"
    )?;
    Ok(())
}

/// Stage 1: embed sources and persist the manifest.
pub fn embed_stage(layout: &Layout, out: &mut impl Write) -> Result<()> {
    let store = ManifestStore::new(layout.manifest_path());
    let mut manifest = store.load()?;

    let report = enrich_manifest(&mut manifest, &layout.manifest_dir());
    for outcome in &report.outcomes {
        writeln!(out, "{outcome}")?;
    }

    if report.embedded() == 0 {
        writeln!(out, "No bookmarklets were updated.")?;
        return Err(BuildError::NothingEmbedded.into());
    }

    store.save(&manifest)?;
    writeln!(out, "\n[OK] Successfully updated {}", store.path().display())?;
    writeln!(
        out,
        "  Embedded code for {} bookmarklet(s)",
        manifest.embedded_count()
    )?;
    Ok(())
}

/// Stage 2: re-read the manifest from disk and rewrite the embedded constant.
pub fn sync_stage(layout: &Layout) -> Result<SyncReport> {
    let config = layout.config();
    let manifest = ManifestStore::new(layout.manifest_path())
        .load()
        .context("failed to reload manifest")?;
    sync_generated_source(
        &manifest,
        &layout.generated_path(),
        &config.constant_name,
        &config.default_icon,
    )
}
