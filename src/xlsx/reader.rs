//! Streaming workbook reader
//!
//! Opens the container ZIP, resolves worksheet parts from the workbook
//! manifest and decodes one worksheet at a time as a forward-only row
//! iterator. The shared-string table is loaded up front (its size is bound
//! by distinct strings, not by row count); everything else streams.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::read::ZipFile;

use super::error::XlsxError;
use super::types::{CellValue, Row};

const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// A worksheet entry from the workbook manifest.
///
/// `id` is the 1-based position of the sheet in workbook order, which is the
/// order sheets are presented to callers.
#[derive(Debug, Clone)]
pub struct SheetMeta {
    pub id: u32,
    pub name: String,
    part: String,
}

/// An opened xlsx workbook.
///
/// Worksheet data is not touched until [`WorkbookReader::sheet_rows`] is
/// called for that sheet; skipping a sheet therefore costs nothing.
pub struct WorkbookReader {
    archive: ZipArchive<BufReader<File>>,
    shared_strings: Vec<String>,
    sheets: Vec<SheetMeta>,
}

impl WorkbookReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, XlsxError> {
        let file = File::open(path.as_ref())?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let shared_strings = match read_part(&mut archive, SHARED_STRINGS_PART)? {
            Some(bytes) => parse_shared_strings(&bytes)?,
            None => Vec::new(),
        };

        let workbook = read_part(&mut archive, WORKBOOK_PART)?
            .ok_or_else(|| XlsxError::MissingPart(WORKBOOK_PART.to_string()))?;
        let rels = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(bytes) => parse_relationships(&bytes)?,
            None => HashMap::new(),
        };
        let sheets = parse_workbook_sheets(&workbook, &rels)?;

        Ok(Self {
            archive,
            shared_strings,
            sheets,
        })
    }

    pub fn sheets(&self) -> &[SheetMeta] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Start streaming rows of the worksheet at `index` (workbook order).
    pub fn sheet_rows(&mut self, index: usize) -> Result<SheetRows<'_>, XlsxError> {
        let Self {
            archive,
            shared_strings,
            sheets,
        } = self;
        let meta = sheets
            .get(index)
            .ok_or_else(|| XlsxError::Malformed(format!("no worksheet at index {}", index)))?;
        let entry = archive.by_name(&meta.part)?;
        Ok(SheetRows {
            reader: Reader::from_reader(BufReader::new(entry)),
            shared: shared_strings,
            buf: Vec::new(),
            next_position: 1,
            finished: false,
        })
    }
}

fn read_part(
    archive: &mut ZipArchive<BufReader<File>>,
    name: &str,
) -> Result<Option<Vec<u8>>, XlsxError> {
    match archive.by_name(name) {
        Ok(mut entry) => {
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Parse `xl/sharedStrings.xml` into the string table.
///
/// Rich-text runs are flattened by concatenating their `<t>` fragments;
/// phonetic (`<rPh>`) annotations are excluded.
fn parse_shared_strings(bytes: &[u8]) -> Result<Vec<String>, XlsxError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" if !in_phonetic => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Text(t) if in_t => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Parse a relationships part into an Id -> Target map.
fn parse_relationships(bytes: &[u8]) -> Result<HashMap<String, String>, XlsxError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Extract the sheet list from `xl/workbook.xml`, in workbook order, and
/// resolve each sheet's ZIP part via the relationships map.
fn parse_workbook_sheets(
    bytes: &[u8],
    rels: &HashMap<String, String>,
) -> Result<Vec<SheetMeta>, XlsxError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"name" => name = attr.unescape_value()?.into_owned(),
                        b"r:id" => rel_id = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                let ordinal = sheets.len() + 1;
                let part = match rel_id.as_ref().and_then(|id| rels.get(id)) {
                    Some(target) => normalize_part_path(target),
                    // Older producers omit the rels part; fall back to the
                    // conventional sheet location.
                    None => format!("xl/worksheets/sheet{}.xml", ordinal),
                };
                sheets.push(SheetMeta {
                    id: ordinal as u32,
                    name,
                    part,
                });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if sheets.is_empty() {
        return Err(XlsxError::Malformed(
            "workbook declares no worksheets".to_string(),
        ));
    }
    Ok(sheets)
}

fn normalize_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// Cell type discriminator from the `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CellType {
    Number,
    SharedString,
    Bool,
    InlineString,
    /// `str`, `d` and `e`: literal text in `<v>`
    Literal,
}

impl CellType {
    fn from_attr(value: &[u8]) -> Self {
        match value {
            b"s" => CellType::SharedString,
            b"b" => CellType::Bool,
            b"inlineStr" => CellType::InlineString,
            b"str" | b"d" | b"e" => CellType::Literal,
            _ => CellType::Number,
        }
    }
}

/// Forward-only iterator over the rows of one worksheet.
///
/// Decodes `<row>`/`<c>` events incrementally from the decompressed ZIP
/// entry; only one row is materialized at a time. Rows absent from the part
/// (fully unpopulated in the source) are not emitted.
pub struct SheetRows<'a> {
    reader: Reader<BufReader<ZipFile<'a>>>,
    shared: &'a [String],
    buf: Vec<u8>,
    next_position: u32,
    finished: bool,
}

impl<'a> SheetRows<'a> {
    fn next_row(&mut self) -> Result<Option<Row>, XlsxError> {
        if self.finished {
            return Ok(None);
        }

        let shared = self.shared;
        let mut in_row = false;
        let mut position = self.next_position;
        let mut values: Vec<CellValue> = Vec::new();
        let mut next_col = 0usize;
        let mut cur_col = 0usize;
        let mut cur_type = CellType::Number;
        let mut in_v = false;
        let mut in_inline_t = false;
        let mut text_buf = String::new();

        loop {
            // All borrows of `self.buf` end with this match; the row to emit
            // (if any) is carried out of it so the buffer can be reused.
            let mut emit: Option<Vec<CellValue>> = None;
            let mut at_eof = false;

            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"row" => {
                        position = row_position(&e)?.unwrap_or(self.next_position);
                        in_row = true;
                        values.clear();
                        next_col = 0;
                    }
                    b"c" if in_row => {
                        let (ref_col, ty) = cell_attrs(&e)?;
                        cur_col = ref_col.unwrap_or(next_col);
                        next_col = cur_col + 1;
                        cur_type = ty;
                        text_buf.clear();
                    }
                    b"v" if in_row => {
                        in_v = true;
                        text_buf.clear();
                    }
                    b"t" if in_row && cur_type == CellType::InlineString => {
                        in_inline_t = true;
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    // A self-closing row has no cells at all.
                    b"row" => {
                        position = row_position(&e)?.unwrap_or(self.next_position);
                        emit = Some(Vec::new());
                    }
                    // A valueless cell; only advances the implicit column.
                    b"c" if in_row => {
                        let (ref_col, _) = cell_attrs(&e)?;
                        cur_col = ref_col.unwrap_or(next_col);
                        next_col = cur_col + 1;
                    }
                    _ => {}
                },
                Event::Text(t) if in_v || in_inline_t => {
                    text_buf.push_str(&t.unescape()?);
                }
                Event::CData(t) if in_v || in_inline_t => {
                    text_buf.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"row" => {
                        emit = Some(std::mem::take(&mut values));
                    }
                    b"v" => {
                        in_v = false;
                        if cur_type != CellType::InlineString {
                            let value = decode_value(shared, cur_type, &text_buf)?;
                            set_cell(&mut values, cur_col, value);
                        }
                    }
                    b"t" => in_inline_t = false,
                    b"c" => {
                        if cur_type == CellType::InlineString && !text_buf.is_empty() {
                            set_cell(
                                &mut values,
                                cur_col,
                                CellValue::Text(std::mem::take(&mut text_buf)),
                            );
                        }
                    }
                    _ => {}
                },
                Event::Eof => at_eof = true,
                _ => {}
            }
            self.buf.clear();

            if let Some(row_values) = emit {
                self.next_position = position + 1;
                return Ok(Some(Row::new(position, row_values)));
            }
            if at_eof {
                if in_row {
                    return Err(XlsxError::Malformed(
                        "worksheet part truncated mid-row".to_string(),
                    ));
                }
                self.finished = true;
                return Ok(None);
            }
        }
    }
}

fn decode_value(shared: &[String], ty: CellType, text: &str) -> Result<CellValue, XlsxError> {
    let value = match ty {
        CellType::SharedString => {
            let idx: usize = text
                .parse()
                .map_err(|_| XlsxError::Malformed(format!("bad shared string index: {:?}", text)))?;
            let s = shared.get(idx).ok_or_else(|| {
                XlsxError::Malformed(format!("shared string index {} out of range", idx))
            })?;
            CellValue::Text(s.clone())
        }
        CellType::Bool => CellValue::Bool(text == "1" || text == "true"),
        CellType::Literal => CellValue::Text(text.to_string()),
        CellType::InlineString => CellValue::Text(text.to_string()),
        CellType::Number => match text.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(text.to_string()),
        },
    };
    Ok(value)
}

impl<'a> Iterator for SheetRows<'a> {
    type Item = Result<Row, XlsxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn row_position(e: &BytesStart<'_>) -> Result<Option<u32>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            let text = attr.unescape_value()?;
            let pos = text
                .parse::<u32>()
                .map_err(|_| XlsxError::Malformed(format!("bad row position: {:?}", text)))?;
            return Ok(Some(pos));
        }
    }
    Ok(None)
}

fn cell_attrs(e: &BytesStart<'_>) -> Result<(Option<usize>, CellType), XlsxError> {
    let mut col = None;
    let mut ty = CellType::Number;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"r" => col = parse_cell_column(&attr.value),
            b"t" => ty = CellType::from_attr(&attr.value),
            _ => {}
        }
    }
    Ok((col, ty))
}

/// Extract the 0-based column index from a cell reference like `BC23`.
fn parse_cell_column(cell_ref: &[u8]) -> Option<usize> {
    let mut col = 0usize;
    let mut seen = false;
    for &b in cell_ref {
        match b {
            b'A'..=b'Z' => {
                col = col * 26 + (b - b'A' + 1) as usize;
                seen = true;
            }
            b'a'..=b'z' => {
                col = col * 26 + (b - b'a' + 1) as usize;
                seen = true;
            }
            _ => break,
        }
    }
    if seen { Some(col - 1) } else { None }
}

fn set_cell(values: &mut Vec<CellValue>, col: usize, value: CellValue) {
    if col >= values.len() {
        values.resize(col + 1, CellValue::Empty);
    }
    values[col] = value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_column() {
        assert_eq!(parse_cell_column(b"A1"), Some(0));
        assert_eq!(parse_cell_column(b"B12"), Some(1));
        assert_eq!(parse_cell_column(b"Z9"), Some(25));
        assert_eq!(parse_cell_column(b"AA1"), Some(26));
        assert_eq!(parse_cell_column(b"BC23"), Some(54));
        assert_eq!(parse_cell_column(b"123"), None);
    }

    #[test]
    fn test_parse_shared_strings() {
        let xml = br#"<?xml version="1.0"?>
            <sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
              <si><t>Name</t></si>
              <si><r><t>Ri</t></r><r><t>ch</t></r></si>
              <si><t>A &amp; B</t></si>
            </sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Name", "Rich", "A & B"]);
    }

    #[test]
    fn test_parse_relationships() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="t" Target="worksheets/sheet1.xml"/>
            <Relationship Id="rId2" Type="t" Target="styles.xml"/>
        </Relationships>"#;
        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.get("rId1").unwrap(), "worksheets/sheet1.xml");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_parse_workbook_sheets() {
        let xml = br#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
                                xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
            <sheets>
              <sheet name="Data" sheetId="4" r:id="rId1"/>
              <sheet name="Notes" sheetId="2" r:id="rId2"/>
            </sheets>
        </workbook>"#;
        let mut rels = HashMap::new();
        rels.insert("rId1".to_string(), "worksheets/sheet1.xml".to_string());
        rels.insert("rId2".to_string(), "worksheets/sheet2.xml".to_string());
        let sheets = parse_workbook_sheets(xml, &rels).unwrap();
        assert_eq!(sheets.len(), 2);
        // ids follow workbook order, not the sheetId attribute
        assert_eq!(sheets[0].id, 1);
        assert_eq!(sheets[0].name, "Data");
        assert_eq!(sheets[0].part, "xl/worksheets/sheet1.xml");
        assert_eq!(sheets[1].id, 2);
    }
}
