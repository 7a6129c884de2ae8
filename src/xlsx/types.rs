//! Cell and row types shared by the reader and writer

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value as stored in the container.
///
/// Numbers are kept as raw `f64` regardless of any date/number formatting in
/// the source workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Whether this value counts as "non-empty" for row significance.
    ///
    /// Mirrors the container format's notion of emptiness: blank cells,
    /// `false`, `0` and the empty string are all vacuous.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) => {
                // Integral values render without a trailing ".0", matching
                // how spreadsheet applications display them.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// One worksheet row: a 1-based source position plus its cell values in
/// column order. Gaps between populated cells appear as [`CellValue::Empty`];
/// there is no padding past the last populated cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub position: u32,
    pub values: Vec<CellValue>,
}

impl Row {
    pub fn new(position: u32, values: Vec<CellValue>) -> Self {
        Self { position, values }
    }
}
