//! Streaming xlsx container support
//!
//! Thin layer over `zip` + `quick-xml` for forward-only workbook access:
//! - [`WorkbookReader`] opens an xlsx file and streams worksheet rows one at
//!   a time; a worksheet whose rows are never requested is never parsed.
//! - [`WorkbookWriter`] produces a single-sheet xlsx file row by row with
//!   inline strings, keeping memory constant regardless of row count.
//!
//! Cell contents are surfaced as [`CellValue`]; no type coercion beyond the
//! container's own cell types is performed.

mod error;
mod reader;
mod types;
mod writer;

pub use error::XlsxError;
pub use reader::{SheetMeta, SheetRows, WorkbookReader};
pub use types::{CellValue, Row};
pub use writer::WorkbookWriter;
