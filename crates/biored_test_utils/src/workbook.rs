//! Minimal SpreadsheetML writer.
//!
//! Writes only the parts a reader needs: content types, workbook, workbook
//! relationships, worksheets and (optionally) the shared string table.
//! Empty cells are omitted, as spreadsheet applications do.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A cell value to write.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl From<&str> for Cell {
    /// Empty strings become empty (absent) cells.
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from(value.as_str())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Convert string rows to cells (`""` is an empty cell).
pub fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|row| row.iter().map(|v| Cell::from(*v)).collect())
        .collect()
}

struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

/// Builds an `.xlsx` workbook in memory.
#[derive(Default)]
pub struct WorkbookBuilder {
    sheets: Vec<Sheet>,
    shared_strings: bool,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a worksheet.
    pub fn sheet(mut self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push(Sheet {
            name: name.to_string(),
            rows,
        });
        self
    }

    /// Store text in `xl/sharedStrings.xml` instead of inline strings.
    pub fn shared_strings(mut self, enabled: bool) -> Self {
        self.shared_strings = enabled;
        self
    }

    /// Serialize the workbook to `.xlsx` bytes.
    pub fn build(self) -> Vec<u8> {
        let mut strings: Vec<String> = Vec::new();
        let mut parts: Vec<(String, String)> = Vec::new();

        for (idx, sheet) in self.sheets.iter().enumerate() {
            let xml = self.sheet_xml(sheet, &mut strings);
            parts.push((format!("xl/worksheets/sheet{}.xml", idx + 1), xml));
        }

        parts.push(("[Content_Types].xml".to_string(), self.content_types()));
        parts.push(("_rels/.rels".to_string(), root_rels()));
        parts.push(("xl/workbook.xml".to_string(), self.workbook_xml()));
        parts.push(("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels()));
        if self.shared_strings {
            parts.push(("xl/sharedStrings.xml".to_string(), shared_strings_xml(&strings)));
        }

        let borrowed: Vec<(&str, &str)> = parts
            .iter()
            .map(|(name, body)| (name.as_str(), body.as_str()))
            .collect();
        zip_parts(&borrowed)
    }

    fn sheet_xml(&self, sheet: &Sheet, strings: &mut Vec<String>) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{MAIN_NS}"><sheetData>"#
        );
        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = row_idx + 1;
            xml.push_str(&format!(r#"<row r="{row_num}">"#));
            for (col_idx, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letters(col_idx), row_num);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) if self.shared_strings => {
                        let index = strings.iter().position(|s| s == text).unwrap_or_else(|| {
                            strings.push(text.clone());
                            strings.len() - 1
                        });
                        xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{index}</v></c>"#));
                    }
                    Cell::Text(text) => {
                        xml.push_str(&format!(
                            r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                            escape(text)
                        ));
                    }
                    Cell::Number(value) => {
                        xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                    }
                    Cell::Bool(value) => {
                        let flag = u8::from(*value);
                        xml.push_str(&format!(r#"<c r="{reference}" t="b"><v>{flag}</v></c>"#));
                    }
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        );
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn workbook_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>"#
        );
        for (idx, sheet) in self.sheets.iter().enumerate() {
            xml.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(&sheet.name),
                idx + 1,
                idx + 1
            ));
        }
        xml.push_str("</sheets></workbook>");
        xml
    }

    fn workbook_rels(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}">"#
        );
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                r#"<Relationship Id="rId{idx}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
            ));
        }
        if self.shared_strings {
            xml.push_str(&format!(
                r#"<Relationship Id="rIdStrings" Type="{REL_NS}/sharedStrings" Target="sharedStrings.xml"/>"#
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn root_rels() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    )
}

fn shared_strings_xml(strings: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="{MAIN_NS}" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    );
    for s in strings {
        xml.push_str(&format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(s)));
    }
    xml.push_str("</sst>");
    xml
}

/// Zip arbitrary named parts. Used directly to craft broken containers.
pub fn zip_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(body.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// 0 -> A, 25 -> Z, 26 -> AA
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_build_is_zip() {
        let bytes = WorkbookBuilder::new()
            .sheet("Data", text_rows(&[&["a", "b"], &["1", ""]]))
            .build();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"xl/workbook.xml"));
        assert!(names.contains(&"xl/worksheets/sheet1.xml"));
        assert!(!names.contains(&"xl/sharedStrings.xml"));
    }
}
