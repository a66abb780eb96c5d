//! `W{w}D{d}`: one training day

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{daily_sheet_name, Theme, DAILY_METRICS, DAY_NAMES};
use crate::Result;

const EXERCISE_ROWS: u32 = 6;

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme, week: u32, day: u32) -> Result<()> {
    let name = daily_sheet_name(week, day);
    let sheet = super::new_sheet(workbook, &name)?;
    let mut w = SheetWriter::new(sheet, theme.secondary);

    let day_name = DAY_NAMES[(day as usize - 1) % DAY_NAMES.len()];
    w.put("A1", format!("{day_name}, WEEK {week}"), &theme.title(14.0))?;
    w.merge("A1:F1")?;

    w.put("A3", "Planned Training:", &theme.subheader())?;
    w.merge("B3:F3")?;
    w.put("B3", "e.g., Chest & Triceps / LISS Cardio", &theme.bordered())?;

    w.put("A5", "WORKOUT LOG", &theme.banner())?;
    w.merge("A5:F5")?;

    w.row_values(
        "A6",
        &["EXERCISE", "SET 1", "SET 2", "SET 3", "SET 4", "RPE / NOTES"],
        &theme.column_header(),
    )?;

    let exercise_label = theme.small().with_border(theme.thin_border());
    for n in 1..=EXERCISE_ROWS {
        let row = 6 + n;
        w.put(&format!("A{row}"), format!("Exercise {n}"), &exercise_label)?;
        w.style_span("B", "F", row, &theme.input())?;
    }

    w.put("A14", "DAILY RPE & NOTES", &theme.banner())?;
    w.merge("A14:F14")?;

    w.put("A16", "Daily Performance Score (1-10)", &theme.subheader())?;
    w.merge("A16:F16")?;

    let first = 17;
    let last = first + DAILY_METRICS.len() - 1;
    for (row, metric) in (first..).zip(DAILY_METRICS) {
        w.put(&format!("A{row}"), metric, &theme.normal_bordered())?;
        w.put(&format!("B{row}"), "/10", &theme.input())?;
    }

    let total = last + 1;
    w.put(&format!("A{total}"), "TOTAL DAILY RPE (Max 50)", &theme.highlight())?;
    w.formula(
        &format!("B{total}"),
        &format!("=SUM(B{first}:B{last})"),
        &theme.highlight_cell(),
    )?;

    let notes = total + 2;
    w.merge(&format!("A{notes}:F{}", notes + 3))?;
    w.put(
        &format!("A{notes}"),
        "Daily Notes & Lessons Learned",
        &theme.subheader().with_border(theme.thin_border()).with_alignment(theme.top_left()),
    )?;
    w.height(notes as u32, 80.0);

    w.widths("A", "A", 25.0)?;
    w.widths("B", "F", 15.0)?;

    tracing::debug!(sheet = %name, "built");
    Ok(())
}
