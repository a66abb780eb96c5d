//! `🏆 SUMMARY`: reflection, results table, next mission

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{PlanConfig, Theme, SUMMARY_SHEET};
use crate::Result;

const FINAL_METRICS: [&str; 3] = ["Weight", "Key Lift PR (e.g., Bench)", "Total Workouts Completed"];

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme, plan: &PlanConfig) -> Result<()> {
    let sheet = super::new_sheet(workbook, SUMMARY_SHEET)?;
    let mut w = SheetWriter::new(sheet, theme.accent);
    let n = plan.weeks;

    w.put("A1", format!("{n}-WEEK SUMMARY - MISSION COMPLETE"), &theme.title(16.0))?;
    w.merge("A1:D1")?;

    w.put("A3", "FINAL REFLECTION & KEY TAKEAWAYS", &theme.banner())?;
    w.merge("A3:D3")?;

    w.merge("A4:D8")?;
    w.put(
        "A4",
        format!(
            "Summarize your {n} weeks: What was your single greatest win? What was the hardest lesson?"
        ),
        &theme.prompt(),
    )?;
    w.height(4, 100.0);

    w.put("A10", "QUANTIFIABLE RESULTS", &theme.banner())?;
    w.merge("A10:D10")?;

    w.row_values("A11", &["Metric", "Start", "End", "Change"], &theme.column_header())?;

    for (row, metric) in (12..).zip(FINAL_METRICS) {
        w.put(&format!("A{row}"), metric, &theme.normal_bordered())?;
        w.style_span("B", "C", row, &theme.input())?;
        w.formula(&format!("D{row}"), &format!("=C{row}-B{row}"), &theme.highlight_cell())?;
    }

    w.put("A16", "NEXT MISSION / FUTURE GOALS", &theme.banner())?;
    w.merge("A16:D16")?;

    w.merge("A17:D20")?;
    w.put(
        "A17",
        "Where do you go from here? What is the next major challenge?",
        &theme.prompt(),
    )?;
    w.height(17, 80.0);

    w.widths("A", "A", 30.0)?;
    w.widths("B", "D", 20.0)?;

    tracing::debug!(sheet = SUMMARY_SHEET, "built");
    Ok(())
}
