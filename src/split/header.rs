//! Header capture

use crate::xlsx::Row;

/// Captures the canonical field-name row for a run.
///
/// The first row offered that has at least one non-empty value becomes the
/// header, is consumed entirely (it never reaches the row filter or the
/// counters) and is immutable from then on. Entirely empty rows offered
/// before capture are refused and fall through to the normal data path.
#[derive(Debug, Default)]
pub struct HeaderCapture {
    header: Option<Vec<String>>,
}

impl HeaderCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a row as header candidate. Returns `true` if the row was
    /// consumed as the header.
    pub fn offer(&mut self, row: &Row) -> bool {
        if self.header.is_some() {
            return false;
        }
        if !row.values.iter().any(|v| v.is_truthy()) {
            return false;
        }
        self.header = Some(row.values.iter().map(|v| v.to_string()).collect());
        true
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }
}
