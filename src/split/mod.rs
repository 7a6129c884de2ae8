//! The split pipeline
//!
//! Re-partitions the first worksheet of one workbook into fixed-size chunk
//! files, single pass, with peak memory bound by the chunk size:
//!
//! row stream -> header capture -> row filter -> chunk accumulator
//!            -> record mapping -> chunk writer
//!
//! Counters and batch state are owned by the pipeline values threaded
//! through [`run`], never by globals, so every stage is testable in
//! isolation (the chunk writer is a trait with an in-memory test double).

mod batch;
mod config;
mod error;
mod header;
mod output;
mod record;
mod runner;

pub use batch::{ChunkAccumulator, SplitStats};
pub use config::{DEFAULT_CHUNK_SIZE, SplitConfig};
pub use error::SplitError;
pub use header::HeaderCapture;
pub use output::{ChunkWriter, XlsxChunkWriter, clear_output_directory};
pub use record::{Record, map_record};
pub use runner::run;
