//! Positional row-to-record mapping

use crate::xlsx::CellValue;

/// A field-named record: `(field name, value)` pairs in header order.
///
/// Built positionally from the header; a plain pair list rather than a map
/// so column order survives and duplicate header names stay representable.
pub type Record = Vec<(String, CellValue)>;

/// Map a raw value sequence onto the captured header.
///
/// For each header index with a corresponding value, the record gets one
/// entry; header fields past the end of the values are omitted (no padding),
/// and values past the end of the header have no field name and are dropped.
/// With no header captured, every row maps to an empty record.
pub fn map_record(header: Option<&[String]>, values: &[CellValue]) -> Record {
    let Some(header) = header else {
        return Record::new();
    };
    header
        .iter()
        .zip(values.iter())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_maps_by_position() {
        let h = header(&["Name", "Age"]);
        let record = map_record(Some(&h), &[text("Alice"), CellValue::Number(30.0)]);
        assert_eq!(
            record,
            vec![
                ("Name".to_string(), text("Alice")),
                ("Age".to_string(), CellValue::Number(30.0)),
            ]
        );
    }

    #[test]
    fn test_short_row_omits_trailing_fields() {
        let h = header(&["Name", "Age", "City"]);
        let record = map_record(Some(&h), &[text("Alice")]);
        assert_eq!(record, vec![("Name".to_string(), text("Alice"))]);
    }

    #[test]
    fn test_extra_values_are_dropped() {
        let h = header(&["Name"]);
        let record = map_record(Some(&h), &[text("Alice"), text("ignored")]);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_no_header_yields_empty_record() {
        let record = map_record(None, &[text("Alice"), text("Bob")]);
        assert!(record.is_empty());
    }

    #[test]
    fn test_present_empty_values_are_kept() {
        let h = header(&["Name", "Age"]);
        let record = map_record(Some(&h), &[CellValue::Empty, CellValue::Number(1.0)]);
        assert_eq!(record[0], ("Name".to_string(), CellValue::Empty));
    }
}
