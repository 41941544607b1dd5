//! Loading and saving documents and artifacts.
//!
//! Every file this crate writes goes to a temporary file in the destination
//! directory and is then renamed over the destination, so a reader sees
//! either the old or the new content in full.
use crate::error::{DeckError, Result};
use crate::ooxml::pptx::Package;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Load a deck.
pub fn load(path: &Path) -> Result<Package> {
    if !path.is_file() {
        return Err(DeckError::document_not_found(path));
    }
    let pkg = Package::open(path).map_err(|e| match DeckError::from(e) {
        DeckError::Corrupt(reason) => {
            DeckError::Corrupt(format!("{}: {}", path.display(), reason))
        },
        other => other,
    })?;
    debug!(path = %path.display(), slides = pkg.slides().len(), "loaded document");
    Ok(pkg)
}

/// Serialize `pkg` and atomically replace `path` with it.
pub fn save(pkg: &mut Package, path: &Path) -> Result<()> {
    let bytes = pkg.to_bytes()?;
    write_atomic(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved document");
    Ok(())
}

/// Write `bytes` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| DeckError::Io(e.error))?;
    Ok(())
}

/// JSON with four-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Atomically write `value` as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &to_pretty_json(value)?)?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Per-document advisory locks.
///
/// Mutations of one working document run one at a time; different documents
/// do not contend. A guard is an owned tokio mutex guard, released when
/// dropped on any exit path.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of the document at `path`.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let lock = self.locks.lock().entry(key).or_default().clone();
        lock.lock_owned().await
    }
}
