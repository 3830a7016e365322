use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::models::MetadataRecord;

/// One sidecar per document, keyed by the document's file stem. A
/// folder-level sidecar would silently lose all but the last document
/// in a folder.
pub fn sidecar_path(document: &Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metadata".to_string());
    document.with_file_name(format!("{}.metadata.json", stem))
}

/// Serialize the record to pretty-printed UTF-8 JSON and rename it into
/// place. Key order is struct declaration order, so unchanged input
/// produces byte-identical output across runs. Any existing sidecar is
/// overwritten in full.
pub fn write_sidecar(path: &Path, record: &MetadataRecord) -> Result<()> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');

    atomic_write(path, &json).map_err(|source| Error::DocumentWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write via a temp file in the target directory and rename into place,
/// so a crash mid-write never leaves a truncated file behind.
pub fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn read_sidecar(path: &Path) -> Result<MetadataRecord> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
