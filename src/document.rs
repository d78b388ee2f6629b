use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub fn load_script(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open script {}", path.display()))?;
    debug!("Loaded {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

pub fn save_script(path: &Path, text: &str) -> Result<()> {
    write_atomic(path, text)
        .with_context(|| format!("Failed to save script {}", path.display()))?;
    info!("Saved {}", path.display());
    Ok(())
}

/// Write to a temp file in the target's directory, then rename it over the
/// target. Readers see either the old contents or the new, never a mix.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Title for exported documents: the file stem, or a generic fallback.
pub fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Roteiro".to_string())
}
