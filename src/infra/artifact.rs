// ============================================================
// Layer 6 — Artifact Writer
// ============================================================
// Every file the tool emits (.mem images, .mem weights, the
// model summary) goes through here. Contents are written to a
// temporary file in the destination directory and renamed over
// the target, so a reader sees either the old file or the
// complete new one, never a partial write.

use anyhow::{Context, Result};
use std::{fs, io::Write, path::Path};

use tempfile::NamedTempFile;

pub struct ArtifactWriter;

impl ArtifactWriter {
    /// Write `contents` to `path`, replacing any existing file.
    /// Missing parent directories are created.
    pub fn write(path: &Path, contents: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output directory '{}'", parent.display()))?;

        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Cannot create temporary file in '{}'", parent.display()))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("Cannot replace '{}'", path.display()))?;

        tracing::debug!("Wrote {} bytes to '{}'", contents.len(), path.display());
        Ok(())
    }
}
