//! `📊 METRICS`: body measurements, progress photos, vision board

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{PlanConfig, Theme, METRICS_SHEET};
use crate::Result;

const MEASUREMENTS: [&str; 6] = [
    "Weight (lbs/kg)",
    "Waist (inches/cm)",
    "Arms (inches/cm)",
    "Chest (inches/cm)",
    "Shoulders (inches/cm)",
    "Body Fat %",
];

const VISION_ITEMS: [&str; 5] = [
    "Inspiration 1",
    "Inspiration 2",
    "Key Quote/Mantra",
    "Reward for Completion",
    "What's at Stake?",
];

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme, plan: &PlanConfig) -> Result<()> {
    let sheet = super::new_sheet(workbook, METRICS_SHEET)?;
    let mut w = SheetWriter::new(sheet, theme.accent);

    w.put("A1", "CORE METRICS & MEASUREMENTS", &theme.title(16.0))?;
    w.merge("A1:D1")?;

    let final_week = format!("Final (Week {})", plan.weeks);
    w.row_values(
        "A3",
        &["Measurement", "Start (Week 1)", &final_week, "Change"],
        &theme.column_header(),
    )?;

    let entry = theme.normal_bordered().with_alignment(theme.center());
    for (row, measurement) in (4..).zip(MEASUREMENTS) {
        w.put(&format!("A{row}"), measurement, &theme.normal_bordered())?;
        w.style_span("B", "C", row, &entry)?;
        w.formula(&format!("D{row}"), &format!("=C{row}-B{row}"), &theme.highlight_cell())?;
    }

    w.put("A11", "PROGRESS PHOTOS", &theme.banner())?;
    w.merge("A11:D11")?;

    w.put("A12", "Start Photo (Front/Back/Side)", &theme.normal())?;
    w.merge("A12:B12")?;
    w.height(12, 100.0);
    w.put("C12", "End Photo (Front/Back/Side)", &theme.normal())?;
    w.merge("C12:D12")?;

    w.put("A15", "VISION BOARD", &theme.banner())?;
    w.merge("A15:D15")?;

    for (row, item) in (16..).zip(VISION_ITEMS) {
        w.put(&format!("A{row}"), item, &theme.normal())?;
        w.merge(&format!("B{row}:D{row}"))?;
        w.style(&format!("B{row}"), &theme.bordered())?;
    }

    w.widths("A", "A", 25.0)?;
    w.widths("B", "D", 20.0)?;

    tracing::debug!(sheet = METRICS_SHEET, "built");
    Ok(())
}
