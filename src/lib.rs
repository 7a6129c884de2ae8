//! xlsx-splitter - Re-partition a large xlsx spreadsheet into bounded chunks
//!
//! Provides:
//! - Streaming workbook reading/writing (forward-only, constant memory)
//! - The split pipeline: header capture, row filtering, batching, chunk output
//! - A run coordinator that drives a whole split end to end

pub mod split;
pub mod xlsx;

// Re-export commonly used types
pub use split::{
    ChunkAccumulator, ChunkWriter, HeaderCapture, Record, SplitConfig, SplitError, SplitStats,
    XlsxChunkWriter, clear_output_directory, map_record, run,
};
pub use xlsx::{CellValue, Row, WorkbookReader, WorkbookWriter, XlsxError};
