//! Write a workbook to disk and read it back

use chrono::TimeZone;
use pretty_assertions::assert_eq;
use rtf_core::{
    BorderLineStyle, BorderStyle, CellRange, CellValue, Color, HorizontalAlignment, Style,
    Workbook,
};
use rtf_xlsx::{XlsxReader, XlsxWriter};
use tempfile::tempdir;

fn sample_workbook() -> Workbook {
    let mut wb = Workbook::empty();
    wb.properties_mut().title = Some("Return to Form".into());
    wb.properties_mut().creator = Some("rtf".into());

    let idx = wb.add_worksheet_with_name("Week 1").unwrap();
    let sheet = wb.worksheet_mut(idx).unwrap();
    let header = Style::new()
        .bold(true)
        .font_color(Color::rgb(0xD4, 0xAF, 0x37))
        .fill_color(Color::rgb(0x0A, 0x0A, 0x0A))
        .horizontal_alignment(HorizontalAlignment::Center)
        .with_border(BorderStyle::all(BorderLineStyle::Thin, Color::rgb(0x33, 0x33, 0x33)));

    sheet.set_tab_color(Some(Color::rgb(0xD4, 0xAF, 0x37)));
    sheet.set_cell_value("A1", "WEEK 1 LOG").unwrap();
    sheet.set_cell_style("A1", &header).unwrap();
    sheet.merge_cells(&CellRange::parse("A1:H1").unwrap()).unwrap();
    sheet.set_cell_value("B4", 3.0).unwrap();
    sheet.set_cell_value("C4", 4.5).unwrap();
    sheet.set_cell_formula("D4", "=C4-B4").unwrap();
    sheet.set_cell_value("A6", "  leading spaces").unwrap();
    sheet.set_cell_style("H9", &header).unwrap();
    sheet.set_column_width(0, 22.0);
    sheet.set_row_height(0, 30.0);

    let idx = wb.add_worksheet_with_name("W1D1").unwrap();
    let sheet = wb.worksheet_mut(idx).unwrap();
    sheet.set_cell_value("A1", "Hydration & Sleep <check>").unwrap();
    wb
}

#[test]
fn test_roundtrip_preserves_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.xlsx");
    let original = sample_workbook();

    XlsxWriter::write_file(&original, &path).unwrap();
    let read = XlsxReader::read_file(&path).unwrap();

    assert_eq!(read.sheet_count(), 2);
    assert_eq!(read.properties().title.as_deref(), Some("Return to Form"));
    assert_eq!(read.properties().created, None);

    let week = read.worksheet_by_name("Week 1").unwrap();
    assert_eq!(week.tab_color(), Some(Color::rgb(0xD4, 0xAF, 0x37)));
    assert_eq!(week.get_value("A1").unwrap(), CellValue::String("WEEK 1 LOG".into()));
    assert_eq!(week.get_value("C4").unwrap(), CellValue::Number(4.5));
    assert_eq!(week.get_formula_at(3, 3), Some("=C4-B4"));
    assert_eq!(
        week.get_value("A6").unwrap(),
        CellValue::String("  leading spaces".into())
    );
    assert_eq!(week.merged_regions(), &[CellRange::parse("A1:H1").unwrap()]);
    assert_eq!(week.column_width(0), 22.0);
    assert_eq!(week.row_height(0), 30.0);

    let original_week = original.worksheet_by_name("Week 1").unwrap();
    assert_eq!(week.cell_style("A1").unwrap(), original_week.cell_style("A1").unwrap());
    // style-only cell survives
    assert_eq!(week.cell_style("H9").unwrap(), original_week.cell_style("H9").unwrap());

    let day = read.worksheet_by_name("W1D1").unwrap();
    assert_eq!(
        day.get_value("A1").unwrap(),
        CellValue::String("Hydration & Sleep <check>".into())
    );
}

#[test]
fn test_cached_formula_values_roundtrip() {
    let mut wb = Workbook::empty();
    let idx = wb.add_worksheet_with_name("Summary").unwrap();
    let sheet = wb.worksheet_mut(idx).unwrap();
    sheet.set_cell_formula("A1", "=1+2").unwrap();
    sheet.set_formula_result(0, 0, CellValue::Number(3.0)).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("cached.xlsx");
    XlsxWriter::write_file(&wb, &path).unwrap();

    let read = XlsxReader::read_file(&path).unwrap();
    let sheet = read.worksheet(0).unwrap();
    assert_eq!(sheet.get_calculated_value_at(0, 0), Some(&CellValue::Number(3.0)));
}

#[test]
fn test_created_timestamp_roundtrip() {
    let mut wb = sample_workbook();
    wb.properties_mut().created = Some(chrono::Utc.with_ymd_and_hms(2026, 1, 5, 6, 30, 0).unwrap());

    let dir = tempdir().unwrap();
    let path = dir.path().join("dated.xlsx");
    XlsxWriter::write_file(&wb, &path).unwrap();

    let read = XlsxReader::read_file(&path).unwrap();
    assert_eq!(read.properties().created, wb.properties().created);
}

#[test]
fn test_rewrites_are_byte_identical() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.xlsx");
    let second = dir.path().join("second.xlsx");

    XlsxWriter::write_file(&sample_workbook(), &first).unwrap();
    XlsxWriter::write_file(&sample_workbook(), &second).unwrap();

    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
}
