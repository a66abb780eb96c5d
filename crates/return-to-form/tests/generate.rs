//! End to end: generate to disk, read back, recalculate

use pretty_assertions::assert_eq;
use return_to_form::prelude::*;
use tempfile::tempdir;

#[test]
fn test_generate_writes_default_file_name() {
    let dir = tempdir().unwrap();
    let plan = PlanConfig {
        output_dir: dir.path().to_path_buf(),
        ..PlanConfig::default()
    };

    let report = generate(&plan).unwrap();
    assert_eq!(
        report.path,
        dir.path().join("Return_to_Form_Ultimate_Edition_12Weeks_GoogleSheets.xlsx")
    );
    assert_eq!(report.sheet_count, 100);
    assert!(report.path.exists());
}

#[test]
fn test_reruns_are_byte_identical() {
    let dir = tempdir().unwrap();
    let first = PlanConfig {
        output: Some(dir.path().join("first.xlsx")),
        ..PlanConfig::default()
    };
    let second = PlanConfig {
        output: Some(dir.path().join("second.xlsx")),
        ..PlanConfig::default()
    };

    generate(&first).unwrap();
    generate(&second).unwrap();

    let a = std::fs::read(first.output_path()).unwrap();
    let b = std::fs::read(second.output_path()).unwrap();
    assert!(a == b, "rerun produced different bytes");
}

#[test]
fn test_read_back_matches_built_workbook() {
    let dir = tempdir().unwrap();
    let plan = PlanConfig {
        weeks: 2,
        output: Some(dir.path().join("plan.xlsx")),
        ..PlanConfig::default()
    };

    let built = build_workbook(&plan).unwrap();
    built.save(plan.output_path()).unwrap();
    let read = Workbook::open(plan.output_path()).unwrap();

    assert_eq!(read.sheet_count(), built.sheet_count());
    assert_eq!(read.properties().title, built.properties().title);
    for (original, loaded) in built.worksheets().zip(read.worksheets()) {
        assert_eq!(loaded.name(), original.name());
        assert_eq!(loaded.tab_color(), original.tab_color());
        assert_eq!(loaded.merged_regions(), original.merged_regions());
        assert_eq!(loaded.custom_column_widths(), original.custom_column_widths());
        assert_eq!(loaded.custom_row_heights(), original.custom_row_heights());

        let original_cells: Vec<_> = original
            .iter_cells()
            .map(|(r, c, d)| (r, c, d.value.clone(), original.cell_style_at(r, c).cloned()))
            .collect();
        let loaded_cells: Vec<_> = loaded
            .iter_cells()
            .map(|(r, c, d)| (r, c, d.value.clone(), loaded.cell_style_at(r, c).cloned()))
            .collect();
        assert_eq!(loaded_cells, original_cells, "sheet {}", original.name());
    }
}

#[test]
fn test_generated_file_passes_checks() {
    let dir = tempdir().unwrap();
    let plan = PlanConfig {
        output: Some(dir.path().join("plan.xlsx")),
        ..PlanConfig::default()
    };
    generate(&plan).unwrap();

    let report = check_workbook(Workbook::open(plan.output_path()).unwrap()).unwrap();
    assert_eq!(report.failures, Vec::<String>::new());
    assert_eq!(report.weeks, Some(12));
    // 6 metrics + 1 RPE guide + 84 daily + 3 summary
    assert_eq!(report.formula_count, 94);
}

#[test]
fn test_filled_inputs_calculate() {
    let mut wb = build_workbook(&PlanConfig::with_weeks(1)).unwrap();

    let idx = wb.sheet_index("W1D1").unwrap();
    let day = wb.worksheet_mut(idx).unwrap();
    for (row, score) in (16..21).zip([9.0, 8.0, 7.0, 8.0, 6.0]) {
        day.set_cell_value_at(row, 1, score).unwrap();
    }

    let idx = wb.sheet_index("🏆 SUMMARY").unwrap();
    let summary = wb.worksheet_mut(idx).unwrap();
    summary.set_cell_value("B12", 190.0).unwrap();
    summary.set_cell_value("C12", 176.0).unwrap();

    wb.calculate().unwrap();

    let day = wb.worksheet_by_name("W1D1").unwrap();
    assert_eq!(day.get_calculated_value_at(21, 1), Some(&CellValue::Number(38.0)));
    let summary = wb.worksheet_by_name("🏆 SUMMARY").unwrap();
    assert_eq!(summary.get_calculated_value_at(11, 3), Some(&CellValue::Number(-14.0)));
    // untouched rows: empty minus empty
    assert_eq!(summary.get_calculated_value_at(12, 3), Some(&CellValue::Number(0.0)));
}

#[test]
fn test_save_rejects_other_extensions() {
    let dir = tempdir().unwrap();
    let wb = build_workbook(&PlanConfig::with_weeks(1)).unwrap();
    assert!(wb.save(dir.path().join("plan.csv")).is_err());
}

#[test]
fn test_generate_rejects_other_extensions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.csv");
    let plan = PlanConfig {
        output: Some(path.clone()),
        ..PlanConfig::with_weeks(1)
    };

    assert!(generate(&plan).is_err());
    assert!(!path.exists());
}
