//! Row filtering and chunk accumulation

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::xlsx::{CellValue, Row};

use super::error::SplitError;
use super::output::ChunkWriter;
use super::record::map_record;

/// Counters for one run, reported once at run end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitStats {
    /// Significant data rows that made it into a chunk.
    pub rows_kept: usize,
    /// Entirely empty rows that were discarded.
    pub rows_skipped: usize,
    /// Chunk files emitted.
    pub chunks_written: usize,
}

/// Whether a row is significant: at least one non-empty value.
pub fn row_has_data(values: &[CellValue]) -> bool {
    values.iter().any(|v| v.is_truthy())
}

/// Buffers significant rows in arrival order and flushes a chunk every
/// `chunk_size` kept rows, plus one final under-full chunk at end of stream.
///
/// Owns the run counters; the caller threads rows in and a [`ChunkWriter`]
/// through, so the accumulator itself never touches the filesystem.
pub struct ChunkAccumulator {
    batch: Vec<Row>,
    stats: SplitStats,
    chunk_size: usize,
}

impl ChunkAccumulator {
    /// `chunk_size` must be validated > 0 by the caller (see `SplitConfig`).
    pub fn new(chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            batch: Vec::with_capacity(chunk_size),
            stats: SplitStats::default(),
            chunk_size,
        }
    }

    pub fn stats(&self) -> &SplitStats {
        &self.stats
    }

    /// Feed one post-header row through the filter and into the batch.
    ///
    /// Returns the path of the chunk file written, if this row filled the
    /// batch to the threshold.
    pub fn push<W: ChunkWriter>(
        &mut self,
        row: Row,
        header: Option<&[String]>,
        writer: &mut W,
    ) -> Result<Option<PathBuf>, SplitError> {
        if !row_has_data(&row.values) {
            self.stats.rows_skipped += 1;
            return Ok(None);
        }

        self.stats.rows_kept += 1;
        self.batch.push(row);

        if self.stats.rows_kept % self.chunk_size == 0 {
            return self.flush(header, writer).map(Some);
        }
        Ok(None)
    }

    /// Flush the remaining partial batch at end of stream, if any, and hand
    /// back the final counters. Never emits an empty chunk.
    pub fn finish<W: ChunkWriter>(
        mut self,
        header: Option<&[String]>,
        writer: &mut W,
    ) -> Result<(Option<PathBuf>, SplitStats), SplitError> {
        let last = if self.batch.is_empty() {
            None
        } else {
            Some(self.flush(header, writer)?)
        };
        Ok((last, self.stats))
    }

    fn flush<W: ChunkWriter>(
        &mut self,
        header: Option<&[String]>,
        writer: &mut W,
    ) -> Result<PathBuf, SplitError> {
        let records: Vec<_> = self
            .batch
            .drain(..)
            .map(|row| map_record(header, &row.values))
            .collect();
        let seq = (self.stats.chunks_written + 1) as u32;
        let path = writer.write_chunk(&records, seq)?;
        self.stats.chunks_written += 1;
        Ok(path)
    }
}
