//! Crash-safe file replacement.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Replace `path` with `contents` via a sibling temp file and a rename.
///
/// Readers never observe a half-written file: they see either the old
/// contents or the new ones. Missing parent directories are created.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "file replaced");
    Ok(())
}

/// `dir/.name.<pid>.tmp`, unique per process so two writers never share it.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "premia".to_owned());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
