//! Snapshot saving operations.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use itemdoc_model::DocumentSnapshot;

use crate::error::{DocumentError, Result};
use crate::options::WriteOptions;
use crate::writer::write_snapshot;

/// Save a snapshot to a document file.
///
/// Uses atomic write (temp file + rename) so an interrupted save never
/// leaves a truncated document behind.
pub fn save_snapshot(snapshot: &DocumentSnapshot, path: &Path, options: &WriteOptions) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DocumentError::io("create directory", parent, e))?;
    }

    let file = File::create(&temp_path).map_err(|e| DocumentError::io("create", &temp_path, e))?;
    let writer = write_snapshot(BufWriter::new(file), snapshot, options)?;
    let file = writer
        .into_inner()
        .map_err(|e| DocumentError::io("write", &temp_path, e.into_error()))?;
    file.sync_all()
        .map_err(|e| DocumentError::io("sync", &temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| DocumentError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::info!("Saved document to {}", path.display());
    Ok(())
}
