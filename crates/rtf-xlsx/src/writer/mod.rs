//! XLSX writer
//!
//! Output is deterministic: parts are written in a fixed order, every zip
//! entry carries the same timestamp, and styles are numbered by first use.
//! Two writes of the same workbook produce identical bytes.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{escape_xml, XlsxStyleTable};
use rtf_core::{CellAddress, CellValue, Workbook, Worksheet};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        log::debug!("writing {} sheets to {}", workbook.sheet_count(), path.display());
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "a workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);
        let style_table = XlsxStyleTable::build(workbook);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_core_props(&mut zip, workbook)?;
        Self::write_app_props(&mut zip, workbook)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_styles_xml(&mut zip, &style_table)?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            Self::write_worksheet(&mut zip, sheet, i, &style_table)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn options() -> SimpleFileOptions {
        // fixed timestamp keeps the archive byte-stable across runs
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        zip.start_file(name, Self::options())?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;
        Self::write_part(zip, "_rels/.rels", content)
    }

    fn write_core_props<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let props = workbook.properties();
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        );

        if let Some(title) = &props.title {
            content.push_str(&format!("\n    <dc:title>{}</dc:title>", escape_xml(title)));
        }
        if let Some(subject) = &props.subject {
            content.push_str(&format!(
                "\n    <dc:subject>{}</dc:subject>",
                escape_xml(subject)
            ));
        }
        if let Some(creator) = &props.creator {
            content.push_str(&format!(
                "\n    <dc:creator>{}</dc:creator>",
                escape_xml(creator)
            ));
        }
        if let Some(created) = &props.created {
            content.push_str(&format!(
                "\n    <dcterms:created xsi:type=\"dcterms:W3CDTF\">{}</dcterms:created>",
                created.format("%Y-%m-%dT%H:%M:%SZ")
            ));
        }

        content.push_str("\n</cp:coreProperties>");
        Self::write_part(zip, "docProps/core.xml", &content)
    }

    fn write_app_props<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut titles = String::new();
        for sheet in workbook.worksheets() {
            titles.push_str(&format!("<vt:lpstr>{}</vt:lpstr>", escape_xml(sheet.name())));
        }

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>rtf-xlsx</Application>
    <HeadingPairs><vt:vector size="2" baseType="variant"><vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant><vt:variant><vt:i4>{count}</vt:i4></vt:variant></vt:vector></HeadingPairs>
    <TitlesOfParts><vt:vector size="{count}" baseType="lpstr">{titles}</vt:vector></TitlesOfParts>
</Properties>"#,
            count = workbook.sheet_count(),
            titles = titles
        );
        Self::write_part(zip, "docProps/app.xml", &content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="0"/>
    </bookViews>
    <sheets>"#,
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
    <calcPr calcId="191029" fullCalcOnLoad="1"/>
</workbook>"#,
        );
        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        let sheet_count = workbook.sheet_count();
        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            sheet_count + 1
        ));
        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    fn write_styles_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        Self::write_part(zip, "xl/styles.xml", &style_table.to_styles_xml())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if let Some(color) = sheet.tab_color() {
            content.push_str(&format!(
                "\n    <sheetPr><tabColor rgb=\"{}\"/></sheetPr>",
                color.to_argb_hex()
            ));
        }

        let dimension = sheet
            .used_range()
            .map(|r| r.to_a1_string())
            .unwrap_or_else(|| "A1".to_string());
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));

        content.push_str(&format!(
            "\n    <sheetViews><sheetView{} workbookViewId=\"0\"/></sheetViews>",
            if index == 0 { " tabSelected=\"1\"" } else { "" }
        ));
        content.push_str("\n    <sheetFormatPr defaultRowHeight=\"15\"/>");

        let widths = sheet.custom_column_widths();
        if !widths.is_empty() {
            content.push_str("\n    <cols>");
            for (col, width) in widths {
                content.push_str(&format!(
                    "\n        <col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"/>",
                    col + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");
        Self::write_sheet_data(&mut content, sheet, index, style_table);
        content.push_str("\n    </sheetData>");

        let merged_regions = sheet.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!(
                    "\n        <mergeCell ref=\"{}\"/>",
                    range.to_a1_string()
                ));
            }
            content.push_str("\n    </mergeCells>");
        }

        content.push_str(
            "\n    <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
        );
        content.push_str("\n</worksheet>");

        Self::write_part(
            zip,
            &format!("xl/worksheets/sheet{}.xml", index + 1),
            &content,
        )
    }

    fn write_sheet_data(
        content: &mut String,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
    ) {
        // rows with cells plus rows that only carry a custom height
        let mut rows: Vec<u32> = sheet.row_indices().collect();
        rows.extend(sheet.custom_row_heights().keys().copied());
        rows.sort_unstable();
        rows.dedup();

        for row in rows {
            let height = sheet
                .custom_row_heights()
                .get(&row)
                .map(|ht| format!(" ht=\"{}\" customHeight=\"1\"", ht))
                .unwrap_or_default();

            let mut cells = String::new();
            for (col, cell) in sheet.iter_row(row) {
                let cell_ref = CellAddress::new(row, col).to_a1_string();
                let xf_id = style_table.xf_id_for(index, cell.style_index);
                let style_attr = if xf_id != 0 {
                    format!(" s=\"{}\"", xf_id)
                } else {
                    String::new()
                };
                Self::write_cell(&mut cells, &cell_ref, &style_attr, &cell.value);
            }

            if cells.is_empty() {
                content.push_str(&format!("\n        <row r=\"{}\"{}/>", row + 1, height));
            } else {
                content.push_str(&format!("\n        <row r=\"{}\"{}>", row + 1, height));
                content.push_str(&cells);
                content.push_str("\n        </row>");
            }
        }
    }

    fn write_cell(out: &mut String, cell_ref: &str, style_attr: &str, value: &CellValue) {
        match value {
            CellValue::Number(n) => {
                out.push_str(&format!(
                    "\n            <c r=\"{}\"{}><v>{}</v></c>",
                    cell_ref, style_attr, n
                ));
            }
            CellValue::String(s) => {
                out.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"inlineStr\"><is>{}</is></c>",
                    cell_ref,
                    style_attr,
                    text_element(s)
                ));
            }
            CellValue::Boolean(b) => {
                out.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    u8::from(*b)
                ));
            }
            CellValue::Error(e) => {
                out.push_str(&format!(
                    "\n            <c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                    cell_ref,
                    style_attr,
                    escape_xml(e.as_str())
                ));
            }
            CellValue::Formula { text, cached_value } => {
                let formula = escape_xml(text.strip_prefix('=').unwrap_or(text));
                let (type_attr, cached) = match cached_value.as_deref() {
                    Some(CellValue::Number(n)) => ("", format!("<v>{}</v>", n)),
                    Some(CellValue::String(s)) => {
                        (" t=\"str\"", format!("<v>{}</v>", escape_xml(s)))
                    }
                    Some(CellValue::Boolean(b)) => (" t=\"b\"", format!("<v>{}</v>", u8::from(*b))),
                    Some(CellValue::Error(e)) => (" t=\"e\"", format!("<v>{}</v>", e.as_str())),
                    _ => ("", String::new()),
                };
                out.push_str(&format!(
                    "\n            <c r=\"{}\"{}{}><f>{}</f>{}</c>",
                    cell_ref, style_attr, type_attr, formula, cached
                ));
            }
            CellValue::Empty => {
                // style-only cells keep their formatting
                if !style_attr.is_empty() {
                    out.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
                }
            }
        }
    }
}

/// `<t>` element, preserving leading/trailing whitespace and newlines
fn text_element(s: &str) -> String {
    let needs_preserve = s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.contains('\n');
    if needs_preserve {
        format!("<t xml:space=\"preserve\">{}</t>", escape_xml(s))
    } else {
        format!("<t>{}</t>", escape_xml(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtf_core::{CellRange, Color, Style};
    use std::io::{Cursor, Read};

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    fn write_to_vec(workbook: &Workbook) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        XlsxWriter::write(workbook, &mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_empty_workbook_rejected() {
        let mut buf = Cursor::new(Vec::new());
        assert!(XlsxWriter::write(&Workbook::empty(), &mut buf).is_err());
    }

    #[test]
    fn test_sheet_xml_layout() {
        let mut wb = Workbook::empty();
        let idx = wb.add_worksheet_with_name("Week 1").unwrap();
        let sheet = wb.worksheet_mut(idx).unwrap();
        sheet.set_tab_color(Some(Color::rgb(0xD4, 0xAF, 0x37)));
        sheet.set_cell_value("A1", "WEEK 1 LOG").unwrap();
        sheet.set_cell_style("A1", &Style::new().bold(true)).unwrap();
        sheet.merge_cells(&CellRange::parse("A1:H1").unwrap()).unwrap();
        sheet.set_cell_formula("D4", "=C4-B4").unwrap();
        sheet.set_column_width(0, 18.0);
        sheet.set_row_height(1, 30.0);

        let xml = part(&write_to_vec(&wb), "xl/worksheets/sheet1.xml");
        assert!(xml.contains("<tabColor rgb=\"FFD4AF37\"/>"));
        assert!(xml.contains("<col min=\"1\" max=\"1\" width=\"18\" customWidth=\"1\"/>"));
        assert!(xml.contains("<row r=\"2\" ht=\"30\" customHeight=\"1\"/>"));
        assert!(xml.contains("<c r=\"A1\" s=\"1\" t=\"inlineStr\"><is><t>WEEK 1 LOG</t></is></c>"));
        assert!(xml.contains("<c r=\"D4\"><f>C4-B4</f></c>"));
        assert!(xml.contains("<mergeCell ref=\"A1:H1\"/>"));

        // sheetPr must precede dimension
        assert!(xml.find("<sheetPr>").unwrap() < xml.find("<dimension").unwrap());
    }

    #[test]
    fn test_sheet_names_escaped() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Hydration & Sleep").unwrap();
        let xml = part(&write_to_vec(&wb), "xl/workbook.xml");
        assert!(xml.contains("name=\"Hydration &amp; Sleep\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut wb = Workbook::empty();
        for name in ["Overview", "Week 1", "W1D1"] {
            let idx = wb.add_worksheet_with_name(name).unwrap();
            let sheet = wb.worksheet_mut(idx).unwrap();
            sheet.set_cell_value("B2", 1.5).unwrap();
            sheet
                .set_cell_style("B2", &Style::new().fill_color(Color::rgb(0x1A, 0x1A, 0x1A)))
                .unwrap();
        }
        assert_eq!(write_to_vec(&wb), write_to_vec(&wb));
    }
}
