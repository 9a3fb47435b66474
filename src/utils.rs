//! Filesystem helpers shared by the stores: timestamped backups and
//! atomic whole-file replacement.

use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

/// Sortable timestamp tag for backup siblings, millisecond resolution.
pub(crate) fn backup_tag(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%S%3f").to_string()
}

/// Copies `path` to a timestamped `.bak` sibling before an overwrite.
///
/// Returns the backup path, or `None` when the file does not exist yet.
/// Backups are never pruned here.
pub(crate) async fn backup_file(path: &Path) -> io::Result<Option<PathBuf>> {
    if fs::metadata(path).await.is_err() {
        return Ok(None);
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("store");
    let backup_name = format!("{}.{}.bak", file_name, backup_tag(Utc::now()));
    let backup_path = path.with_file_name(backup_name);
    fs::copy(path, &backup_path).await?;
    Ok(Some(backup_path))
}

/// Writes `bytes` to `path` via a temp file in the same directory, so the
/// destination is only ever replaced by fully written content.
pub(crate) async fn write_atomic(path: &Path, bytes: Vec<u8>) -> io::Result<()> {
    let path = path.to_path_buf();
    task::spawn_blocking(move || {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
