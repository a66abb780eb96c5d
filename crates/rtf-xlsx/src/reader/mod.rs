//! XLSX reader
//!
//! Reads back the subset of SpreadsheetML the writer produces, plus shared
//! strings so that files re-saved by a spreadsheet application still load.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr, parse_color, read_styles_xml};
use rtf_core::{CellAddress, CellError, CellRange, CellValue, Style, Workbook, Worksheet};

/// Decode `_xHHHH_` escapes used for control characters in cell text
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = tail
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| tail.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &tail[7..];
            }
            None => {
                result.push_str("_x");
                rest = &tail[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Raw pieces of a `<c>` element collected while parsing
#[derive(Default)]
struct PendingCell {
    reference: String,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("reading {}", path.display());
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        for (name, r_id) in &sheet_info {
            let path = sheet_paths
                .get(r_id)
                .ok_or_else(|| XlsxError::MissingPart(format!("relationship {}", r_id)))?;
            let sheet_idx = workbook.add_worksheet_with_name(name)?;
            let worksheet = workbook
                .worksheet_mut(sheet_idx)
                .ok_or_else(|| XlsxError::InvalidFormat("Sheet not found".into()))?;
            Self::read_worksheet(&mut archive, path, worksheet, &shared_strings, &styles)?;
        }

        Self::read_core_props(&mut archive, &mut workbook)?;

        log::debug!("read {} sheets", workbook.sheet_count());
        Ok(workbook)
    }

    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![Style::default()]),
        }
    }

    /// Sheet names and relationship ids, in tab order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"r:id")) {
                        sheets.push((name, r_id));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Worksheet relationship id -> archive path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let id = attr(&e, b"Id");
                    let target = attr(&e, b"Target");
                    let rel_type = attr(&e, b"Type");
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn read_core_props<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        workbook: &mut Workbook,
    ) -> XlsxResult<()> {
        let file = match archive.by_name("docProps/core.xml") {
            Ok(f) => f,
            Err(_) => return Ok(()),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut field: Option<Vec<u8>> = None;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => field = Some(e.local_name().as_ref().to_vec()),
                Event::End(_) => field = None,
                Event::Text(e) => {
                    let text = e.unescape()?.into_owned();
                    let props = workbook.properties_mut();
                    match field.as_deref() {
                        Some(b"title") => props.title = Some(text),
                        Some(b"subject") => props.subject = Some(text),
                        Some(b"creator") => props.creator = Some(text),
                        Some(b"created") => {
                            let created = DateTime::parse_from_rfc3339(&text).map_err(|e| {
                                XlsxError::Parse(format!("Invalid created date '{}': {}", text, e))
                            })?;
                            props.created = Some(created.with_timezone(&Utc));
                        }
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // whitespace inside <t> is significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            let event = xml_reader.read_event_into(&mut buf)?;
            let is_empty = matches!(event, Event::Empty(_));
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => match e.name().as_ref() {
                    b"tabColor" => worksheet.set_tab_color(Some(parse_color(e))),
                    b"col" => Self::read_col(worksheet, e),
                    b"row" => Self::read_row(worksheet, e),
                    b"c" => {
                        let pending = PendingCell {
                            reference: attr(e, b"r").unwrap_or_default(),
                            cell_type: attr(e, b"t"),
                            style: attr(e, b"s").and_then(|s| s.parse().ok()),
                            ..PendingCell::default()
                        };
                        if is_empty {
                            Self::process_cell(worksheet, pending, shared_strings, styles)?;
                        } else {
                            cell = Some(pending);
                        }
                    }
                    b"v" if cell.is_some() && !is_empty => in_value = true,
                    b"f" if cell.is_some() && !is_empty => in_formula = true,
                    b"t" if cell.is_some() && !is_empty => in_inline_text = true,
                    b"mergeCell" => {
                        if let Some(reference) = attr(e, b"ref") {
                            let range = CellRange::parse(&reference)?;
                            worksheet.merge_cells(&range)?;
                        }
                    }
                    _ => {}
                },
                Event::Text(ref e) => {
                    if let Some(pending) = cell.as_mut() {
                        let text = e.unescape()?;
                        if in_value {
                            pending.value.get_or_insert_with(String::new).push_str(&text);
                        } else if in_formula {
                            pending.formula.get_or_insert_with(String::new).push_str(&text);
                        } else if in_inline_text {
                            pending.value.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Event::End(ref e) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            Self::process_cell(worksheet, pending, shared_strings, styles)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn read_col(worksheet: &mut Worksheet, e: &BytesStart<'_>) {
        let min = attr(e, b"min").and_then(|s| s.parse::<u16>().ok());
        let max = attr(e, b"max").and_then(|s| s.parse::<u16>().ok());
        let width = attr(e, b"width").and_then(|s| s.parse::<f64>().ok());
        if let (Some(min), Some(max), Some(width)) = (min, max, width) {
            for col in min.max(1)..=max {
                worksheet.set_column_width(col - 1, width);
            }
        }
    }

    fn read_row(worksheet: &mut Worksheet, e: &BytesStart<'_>) {
        let custom = attr(e, b"customHeight").map_or(false, |s| s == "1" || s == "true");
        if !custom {
            return;
        }
        let row = attr(e, b"r").and_then(|s| s.parse::<u32>().ok());
        let height = attr(e, b"ht").and_then(|s| s.parse::<f64>().ok());
        if let (Some(row), Some(height)) = (row, height) {
            worksheet.set_row_height(row.saturating_sub(1), height);
        }
    }

    fn process_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(&cell.reference).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell.reference, e))
        })?;
        let cell_type = cell.cell_type.as_deref();

        if let Some(f) = cell.formula {
            let cached = match cell.value.as_deref() {
                Some(v) => Some(Self::typed_value(cell_type, v, shared_strings)?),
                None => None,
            };
            worksheet.set_cell_value_at(
                addr.row,
                addr.col,
                CellValue::Formula {
                    text: format!("={}", f.strip_prefix('=').unwrap_or(&f)),
                    cached_value: cached.map(Box::new),
                },
            )?;
        } else if let Some(v) = cell.value.as_deref() {
            let value = Self::typed_value(cell_type, v, shared_strings)?;
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }

        if let Some(s) = cell.style.filter(|&s| s != 0) {
            let style = styles
                .get(s as usize)
                .ok_or_else(|| XlsxError::Parse(format!("Style index {} out of bounds", s)))?;
            worksheet.set_cell_style_at(addr.row, addr.col, style)?;
        }

        Ok(())
    }

    fn typed_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        Ok(match cell_type {
            Some("s") => {
                let idx: usize = value.parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),
            Some("e") => CellError::parse(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::String(value.to_string())),
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(value)),
            None | Some("n") => match value.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },
            Some(_) => CellValue::String(value.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("Line1_x000a_Line2"), "Line1\nLine2");
        assert_eq!(decode_excel_escapes("a_x0009_b"), "a\tb");
        assert_eq!(decode_excel_escapes("no escapes"), "no escapes");
        assert_eq!(decode_excel_escapes("_x00_partial"), "_x00_partial");
        assert_eq!(decode_excel_escapes("W1D1_x"), "W1D1_x");
    }

    #[test]
    fn test_typed_values() {
        let shared = vec!["Bench".to_string()];
        assert_eq!(
            XlsxReader::typed_value(Some("s"), "0", &shared).unwrap(),
            CellValue::String("Bench".into())
        );
        assert_eq!(
            XlsxReader::typed_value(None, "7.5", &shared).unwrap(),
            CellValue::Number(7.5)
        );
        assert_eq!(
            XlsxReader::typed_value(Some("e"), "#DIV/0!", &shared).unwrap(),
            CellValue::Error(CellError::Div0)
        );
        assert!(XlsxReader::typed_value(Some("s"), "3", &shared).is_err());
    }

    #[test]
    fn test_not_a_zip() {
        let data = std::io::Cursor::new(b"not an xlsx".to_vec());
        assert!(XlsxReader::read(data).is_err());
    }
}
