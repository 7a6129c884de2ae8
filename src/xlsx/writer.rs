//! Streaming single-sheet workbook writer
//!
//! Emits the fixed package parts up front, then streams `sheet1.xml` row by
//! row straight into the ZIP entry. Strings are written inline, so no
//! shared-string table has to be held in memory and file size stays
//! proportional to what has been written.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::XlsxError;
use super::types::CellValue;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf/></cellStyleXfs><cellXfs count="1"><xf/></cellXfs></styleSheet>"#;

const SHEET_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#;

const SHEET_FOOTER: &str = "</sheetData></worksheet>";

/// Writes one xlsx file containing a single worksheet named `Sheet1`.
///
/// Rows are appended in order with [`WorkbookWriter::write_row`]; the file is
/// not a valid container until [`WorkbookWriter::finish`] has run.
pub struct WorkbookWriter {
    zip: ZipWriter<BufWriter<File>>,
    next_row: u32,
}

impl WorkbookWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, XlsxError> {
        let file = File::create(path.as_ref())?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, body) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/styles.xml", STYLES),
        ] {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }

        // The worksheet part stays open; rows stream directly into it.
        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(SHEET_HEADER.as_bytes())?;

        Ok(Self { zip, next_row: 1 })
    }

    /// Append one row. Empty cells are skipped, leaving a column gap in the
    /// part rather than an explicit blank cell.
    pub fn write_row(&mut self, values: &[CellValue]) -> Result<(), XlsxError> {
        let row_num = self.next_row;
        let mut xml = String::with_capacity(32 + values.len() * 24);

        if values.iter().all(|v| matches!(v, CellValue::Empty)) {
            xml.push_str(&format!("<row r=\"{}\"/>", row_num));
        } else {
            xml.push_str(&format!("<row r=\"{}\">", row_num));
            for (col, value) in values.iter().enumerate() {
                let cell_ref = format!("{}{}", column_ref(col), row_num);
                match value {
                    CellValue::Empty => {}
                    CellValue::Bool(b) => {
                        xml.push_str(&format!(
                            "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
                            cell_ref,
                            if *b { 1 } else { 0 }
                        ));
                    }
                    CellValue::Number(_) => {
                        xml.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, value));
                    }
                    CellValue::Text(s) => {
                        xml.push_str(&format!(
                            "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                            cell_ref,
                            escape(s.as_str())
                        ));
                    }
                }
            }
            xml.push_str("</row>");
        }

        self.zip.write_all(xml.as_bytes())?;
        self.next_row = row_num + 1;
        Ok(())
    }

    /// Number of rows written so far.
    pub fn rows_written(&self) -> u32 {
        self.next_row - 1
    }

    /// Close the worksheet part and the archive. Must be called, or the
    /// output file is left truncated.
    pub fn finish(mut self) -> Result<(), XlsxError> {
        self.zip.write_all(SHEET_FOOTER.as_bytes())?;
        self.zip.finish()?;
        Ok(())
    }
}

/// 0-based column index to spreadsheet letters (0 -> A, 26 -> AA).
fn column_ref(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
