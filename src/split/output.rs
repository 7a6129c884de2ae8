//! Output directory management and chunk file writing

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::xlsx::{CellValue, WorkbookWriter};

use super::error::SplitError;
use super::record::Record;

/// Delete every entry directly inside `dir` (non-recursive).
///
/// Returns `None` when the directory does not exist so the caller can report
/// the absence, and the deleted paths otherwise. Any failure to enumerate or
/// delete is fatal, since partial cleanup could silently mix old and new
/// chunks. Idempotent.
pub fn clear_output_directory(dir: &Path) -> Result<Option<Vec<PathBuf>>, SplitError> {
    if !dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(dir).map_err(|source| SplitError::OutputCleanup {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut deleted = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SplitError::OutputCleanup {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        fs::remove_file(&path).map_err(|source| SplitError::OutputCleanup {
            path: path.clone(),
            source,
        })?;
        deleted.push(path);
    }
    Ok(Some(deleted))
}

/// Destination for flushed chunks.
///
/// A trait so the accumulation logic can be exercised against an in-memory
/// double; the production implementation is [`XlsxChunkWriter`].
pub trait ChunkWriter {
    /// Persist one ordered batch of records as chunk number `seq`.
    fn write_chunk(&mut self, records: &[Record], seq: u32) -> Result<PathBuf, SplitError>;
}

/// Writes each chunk as `part<seq>_<timestamp>.xlsx` in the output
/// directory, header row first, one worksheet per file.
pub struct XlsxChunkWriter {
    output_dir: PathBuf,
}

impl XlsxChunkWriter {
    /// Creates the output directory if it does not exist yet.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, SplitError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| SplitError::OutputDir {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    fn chunk_path(&self, seq: u32) -> PathBuf {
        // ISO-8601 instant with `:` replaced for filesystem safety; the
        // timestamp guards against collisions with files from prior runs.
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3fZ");
        self.output_dir
            .join(format!("part{}_{}.xlsx", seq, timestamp))
    }
}

impl ChunkWriter for XlsxChunkWriter {
    fn write_chunk(&mut self, records: &[Record], seq: u32) -> Result<PathBuf, SplitError> {
        let path = self.chunk_path(seq);
        let columns = column_order(records);

        let wrap = |source: crate::xlsx::XlsxError| SplitError::ChunkWrite {
            path: path.clone(),
            source,
        };

        let mut writer = WorkbookWriter::create(&path).map_err(&wrap)?;
        writer
            .write_row(
                &columns
                    .iter()
                    .map(|name| CellValue::Text(name.clone()))
                    .collect::<Vec<_>>(),
            )
            .map_err(&wrap)?;

        for (index, record) in records.iter().enumerate() {
            tracing::debug!(row = index + 1, record = ?record, "chunk record");
            let values: Vec<CellValue> = columns
                .iter()
                .map(|name| {
                    record
                        .iter()
                        .find(|(field, _)| field == name)
                        .map(|(_, value)| value.clone())
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            writer.write_row(&values).map_err(&wrap)?;
        }

        writer.finish().map_err(&wrap)?;
        Ok(path)
    }
}

/// Column order for a chunk: the union of record keys in first-appearance
/// order. With records built from the header this is simply the header order.
fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns = Vec::new();
    for record in records {
        for (name, _) in record {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_absent_directory_reports_absence() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");
        let deleted = clear_output_directory(&missing).unwrap();
        assert_eq!(deleted, None);
        assert!(!missing.exists());
    }

    #[test]
    fn test_clear_distinguishes_empty_from_absent() {
        let dir = tempfile::tempdir().unwrap();
        // An existing-but-empty directory is a clear, not an absence.
        let deleted = clear_output_directory(dir.path()).unwrap();
        assert_eq!(deleted, Some(Vec::new()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale1.xlsx"), b"old").unwrap();
        fs::write(dir.path().join("stale2.xlsx"), b"old").unwrap();

        let deleted = clear_output_directory(dir.path()).unwrap().unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        // Second pass: still empty, still no error.
        let deleted = clear_output_directory(dir.path()).unwrap().unwrap();
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_column_order_is_first_appearance_union() {
        let records = vec![
            vec![
                ("Name".to_string(), CellValue::Text("a".into())),
                ("Age".to_string(), CellValue::Number(1.0)),
            ],
            vec![
                ("Name".to_string(), CellValue::Text("b".into())),
                ("City".to_string(), CellValue::Text("x".into())),
            ],
        ];
        assert_eq!(column_order(&records), vec!["Name", "Age", "City"]);
    }

    #[test]
    fn test_chunk_filename_shape() {
        let dir = tempfile::tempdir().unwrap();
        let writer = XlsxChunkWriter::new(dir.path()).unwrap();
        let path = writer.chunk_path(3);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("part3_"));
        assert!(name.ends_with(".xlsx"));
        assert!(!name.contains(':'));
    }
}
