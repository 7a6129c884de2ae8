//! Run coordinator

use super::batch::{ChunkAccumulator, SplitStats};
use super::config::SplitConfig;
use super::error::SplitError;
use super::header::HeaderCapture;
use super::output::{XlsxChunkWriter, clear_output_directory};
use crate::xlsx::WorkbookReader;

/// Drive one complete split run.
///
/// Order of operations: input existence check, output cleanup, then a single
/// forward pass over the first worksheet routing every row through header
/// capture, the row filter and the chunk accumulator, with a final flush at
/// end of stream. Worksheets after the first are skipped without being
/// parsed. Per-deletion and per-chunk progress goes to stdout, matching the
/// batch-tool contract; the caller prints the summary from the returned
/// [`SplitStats`].
///
/// A missing input aborts before the output directory is touched.
pub fn run(config: &SplitConfig) -> Result<SplitStats, SplitError> {
    if !config.input.exists() {
        return Err(SplitError::InputNotFound(config.input.clone()));
    }

    match clear_output_directory(&config.output_dir)? {
        None => println!("Output folder does not exist."),
        Some(deleted) => {
            for path in deleted {
                println!("Deleted file: {}", path.display());
            }
            println!("Output folder cleared.");
        }
    }

    let mut reader = WorkbookReader::open(&config.input)?;
    let mut writer = XlsxChunkWriter::new(&config.output_dir)?;
    let mut capture = HeaderCapture::new();
    let mut accumulator = ChunkAccumulator::new(config.chunk_size);

    let skipped_sheets = reader.sheet_count().saturating_sub(1);
    if skipped_sheets > 0 {
        tracing::debug!(skipped_sheets, "only the first worksheet is processed");
    }

    println!("Processing: {}", config.input.display());
    for row in reader.sheet_rows(0)? {
        let row = row?;
        if capture.offer(&row) {
            continue;
        }
        if let Some(path) = accumulator.push(row, capture.header(), &mut writer)? {
            println!("Saved chunk to file: {}", path.display());
        }
    }

    let (last, stats) = accumulator.finish(capture.header(), &mut writer)?;
    if let Some(path) = last {
        println!("Saved chunk to file: {}", path.display());
    }

    tracing::info!(
        rows_kept = stats.rows_kept,
        rows_skipped = stats.rows_skipped,
        chunks_written = stats.chunks_written,
        "split run complete"
    );
    Ok(stats)
}
