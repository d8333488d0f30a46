//! SpreadsheetML (`.xlsx`) reader
//!
//! Reads only what validation needs: sheet names, the shared string table and
//! cell values. Styles, formulas and formatting are ignored; a formula cell
//! yields its cached value.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::LoadError;
use crate::table::CellValue;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
/// Excel's column limit (XFD)
const MAX_COLUMNS: usize = 16_384;

/// A worksheet listed in the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub name: String,
    /// Zip entry holding the worksheet XML
    pub part: String,
}

/// One worksheet row: its 1-based worksheet row number and dense cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub number: usize,
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_empty)
    }
}

/// An opened workbook.
pub struct Workbook<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    sheets: Vec<SheetEntry>,
    shared_strings: Vec<String>,
}

impl<'a> Workbook<'a> {
    /// Open an `.xlsx` container and read its sheet list and shared strings.
    pub fn open(bytes: &'a [u8]) -> Result<Self, LoadError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| LoadError::malformed(format!("not an .xlsx container ({})", e)))?;

        let workbook_xml = read_part(&mut archive, WORKBOOK_PART)?
            .ok_or_else(|| LoadError::malformed("workbook part xl/workbook.xml is missing"))?;

        let relationships = match read_part(&mut archive, WORKBOOK_RELS_PART)? {
            Some(xml) => parse_relationships(&xml)?,
            None => Vec::new(),
        };

        let sheets = parse_sheets(&workbook_xml, &relationships)?;
        if sheets.is_empty() {
            return Err(LoadError::malformed("workbook contains no worksheets"));
        }

        let strings_part = relationships
            .iter()
            .find(|r| r.kind.ends_with("/sharedStrings"))
            .map(|r| r.target.clone())
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PART.to_string());
        let shared_strings = match read_part(&mut archive, &strings_part)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        debug!(
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            "opened workbook"
        );

        Ok(Self {
            archive,
            sheets,
            shared_strings,
        })
    }

    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Sheet whose name matches `name` (trimmed, case-insensitive).
    pub fn find_sheet(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.sheets
            .iter()
            .position(|s| s.name.trim().to_lowercase() == wanted)
    }

    /// Read every row of the sheet at `index`.
    pub fn read_rows(&mut self, index: usize) -> Result<Vec<SheetRow>, LoadError> {
        let entry = self
            .sheets
            .get(index)
            .ok_or_else(|| LoadError::malformed(format!("worksheet {} does not exist", index)))?;
        let part = entry.part.clone();
        let name = entry.name.clone();
        let xml = read_part(&mut self.archive, &part)?.ok_or_else(|| {
            LoadError::malformed(format!("worksheet '{}' has no data part ({})", name, part))
        })?;
        parse_sheet(&xml, &self.shared_strings)
    }
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, LoadError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(LoadError::malformed(format!("cannot read {}: {}", name, e))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| LoadError::malformed(format!("cannot read {}: {}", name, e)))?;
    Ok(Some(content))
}

fn xml_error(part: &str, err: impl fmt::Display) -> LoadError {
    LoadError::malformed(format!("invalid XML in {}: {}", part, err))
}

/// Attribute value by local name (`r:id` matches `id`).
fn attribute(element: &BytesStart<'_>, name: &[u8], part: &str) -> Result<Option<String>, LoadError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(part, e))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| xml_error(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

struct Relationship {
    id: String,
    kind: String,
    /// Zip entry name the target resolves to
    target: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();
    loop {
        match reader
            .read_event()
            .map_err(|e| xml_error(WORKBOOK_RELS_PART, e))?
        {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attribute(&e, b"Id", WORKBOOK_RELS_PART)?.unwrap_or_default();
                let kind = attribute(&e, b"Type", WORKBOOK_RELS_PART)?.unwrap_or_default();
                let target = attribute(&e, b"Target", WORKBOOK_RELS_PART)?.unwrap_or_default();
                relationships.push(Relationship {
                    id,
                    kind,
                    target: resolve_target(&target),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// Relationship targets are relative to `xl/` unless absolute.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

fn parse_sheets(xml: &str, relationships: &[Relationship]) -> Result<Vec<SheetEntry>, LoadError> {
    let targets: HashMap<&str, &str> = relationships
        .iter()
        .map(|r| (r.id.as_str(), r.target.as_str()))
        .collect();

    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event().map_err(|e| xml_error(WORKBOOK_PART, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let position = sheets.len() + 1;
                let name = attribute(&e, b"name", WORKBOOK_PART)?
                    .unwrap_or_else(|| format!("Sheet{}", position));
                let part = attribute(&e, b"id", WORKBOOK_PART)?
                    .and_then(|id| targets.get(id.as_str()).map(|t| t.to_string()))
                    .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", position));
                sheets.push(SheetEntry { name, part });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheets)
}

/// Shared strings: plain `<si><t>` or rich text runs; phonetic runs skipped.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>, LoadError> {
    let part = DEFAULT_SHARED_STRINGS_PART;
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" if !in_phonetic => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(|e| xml_error(part, e))?);
            }
            Event::CData(t) if in_text => {
                current.push_str(&String::from_utf8_lossy(&t));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// Cell under construction while its children are read.
#[derive(Default)]
struct PendingCell {
    column: usize,
    kind: Option<String>,
    value: String,
    inline: String,
}

#[derive(Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<Vec<SheetRow>, LoadError> {
    let part = "worksheet";
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<SheetRow> = Vec::new();
    let mut current: Option<SheetRow> = None;
    let mut cell: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut in_phonetic = false;

    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => current = Some(start_row(&e, &rows, part)?),
                b"c" => cell = Some(start_cell(&e, current.as_ref(), part)?),
                b"v" if cell.is_some() => target = TextTarget::Value,
                b"t" if cell.is_some() && !in_phonetic => target = TextTarget::Inline,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => rows.push(start_row(&e, &rows, part)?),
                // Styled but valueless cell: still advances the implicit column
                b"c" => {
                    let empty = start_cell(&e, current.as_ref(), part)?;
                    if let Some(row) = current.as_mut() {
                        place(row, empty.column, CellValue::Empty);
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(pending) = cell.as_mut() {
                    let text = t.unescape().map_err(|e| xml_error(part, e))?;
                    match target {
                        TextTarget::Value => pending.value.push_str(&text),
                        TextTarget::Inline => pending.inline.push_str(&text),
                        TextTarget::None => {}
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => target = TextTarget::None,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let (Some(pending), Some(row)) = (cell.take(), current.as_mut()) {
                        let column = pending.column;
                        let value = finish_cell(pending, shared_strings)?;
                        place(row, column, value);
                    }
                }
                b"row" => {
                    if let Some(row) = current.take() {
                        rows.push(row);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rows)
}

fn start_row(element: &BytesStart<'_>, rows: &[SheetRow], part: &str) -> Result<SheetRow, LoadError> {
    let number = match attribute(element, b"r", part)? {
        Some(r) => r
            .trim()
            .parse::<usize>()
            .map_err(|_| LoadError::malformed(format!("invalid row number '{}'", r)))?,
        None => rows.last().map(|r| r.number + 1).unwrap_or(1),
    };
    Ok(SheetRow {
        number,
        cells: Vec::new(),
    })
}

fn start_cell(
    element: &BytesStart<'_>,
    row: Option<&SheetRow>,
    part: &str,
) -> Result<PendingCell, LoadError> {
    let column = match attribute(element, b"r", part)? {
        Some(reference) => column_index(&reference)
            .ok_or_else(|| LoadError::malformed(format!("invalid cell reference '{}'", reference)))?,
        None => row.map(|r| r.cells.len()).unwrap_or(0),
    };
    if column >= MAX_COLUMNS {
        return Err(LoadError::malformed(format!(
            "cell column {} exceeds the worksheet limit",
            column + 1
        )));
    }
    Ok(PendingCell {
        column,
        kind: attribute(element, b"t", part)?,
        ..PendingCell::default()
    })
}

fn finish_cell(cell: PendingCell, shared_strings: &[String]) -> Result<CellValue, LoadError> {
    let value = cell.value.trim();
    let result = match cell.kind.as_deref() {
        Some("s") => {
            if value.is_empty() {
                return Ok(CellValue::Empty);
            }
            let index: usize = value
                .parse()
                .map_err(|_| LoadError::malformed(format!("invalid shared string index '{}'", value)))?;
            let text = shared_strings.get(index).ok_or_else(|| {
                LoadError::malformed(format!("shared string index {} out of range", index))
            })?;
            CellValue::from(text.as_str())
        }
        Some("inlineStr") => CellValue::from(cell.inline.as_str()),
        Some("str") | Some("d") => CellValue::from(cell.value.as_str()),
        Some("b") => CellValue::Bool(value == "1" || value.eq_ignore_ascii_case("true")),
        Some("e") => CellValue::Error(value.to_string()),
        _ if value.is_empty() => CellValue::Empty,
        _ => match value.parse::<f64>() {
            Ok(number) => CellValue::Number(number),
            Err(_) => CellValue::Text(value.to_string()),
        },
    };
    Ok(result)
}

fn place(row: &mut SheetRow, column: usize, value: CellValue) {
    if row.cells.len() <= column {
        row.cells.resize(column + 1, CellValue::Empty);
    }
    row.cells[column] = value;
}

/// `B7` -> 1, `AA3` -> 26
fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for letter in letters {
        index = index
            .checked_mul(26)?
            .checked_add((letter.to_ascii_uppercase() - b'A' + 1) as usize)?;
    }
    Some(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("B7"), Some(1));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("ab3"), Some(27));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn test_shared_strings_rich_text() {
        let xml = r#"<sst><si><t>Plain</t></si><si><r><t>Rich </t></r><r><t>text</t></r><rPh><t>skip</t></rPh></si><si/></sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["Plain", "Rich text", ""]);
    }

    #[test]
    fn test_parse_sheet_cell_kinds() {
        let strings = vec!["Name".to_string()];
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="inlineStr"><is><t>Amount &amp; more</t></is></c></row>
            <row r="3"><c r="A3"><v>12.5</v></c><c r="B3" t="b"><v>1</v></c><c r="C3" t="e"><v>#N/A</v></c><c r="D3" t="str"><f>A1</f><v>Name</v></c></row>
        </sheetData></worksheet>"#;
        let rows = parse_sheet(xml, &strings).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 1);
        assert_eq!(
            rows[0].cells,
            vec![
                CellValue::Text("Name".into()),
                CellValue::Empty,
                CellValue::Text("Amount & more".into()),
            ]
        );
        assert_eq!(rows[1].number, 3);
        assert_eq!(
            rows[1].cells,
            vec![
                CellValue::Number(12.5),
                CellValue::Bool(true),
                CellValue::Error("#N/A".into()),
                CellValue::Text("Name".into()),
            ]
        );
    }

    #[test]
    fn test_shared_string_out_of_range() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>4</v></c></row></sheetData></worksheet>"#;
        let err = parse_sheet(xml, &[]).unwrap_err();
        assert!(matches!(err, LoadError::MalformedFile { .. }));
    }

    #[test]
    fn test_unbalanced_xml_is_malformed() {
        let xml = r#"<worksheet><sheetData><row r="1"></sheetData></worksheet>"#;
        assert!(parse_sheet(xml, &[]).is_err());
    }
}
