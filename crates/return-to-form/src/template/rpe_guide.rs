//! `🔥 RPE GUIDE`: exertion scale and the daily score worksheet

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{Theme, DAILY_METRICS, RPE_GUIDE_SHEET};
use crate::Result;

/// Score (kept as text), intensity, description
const RPE_SCALE: [[&str; 3]; 5] = [
    ["10", "Failure / Max Effort", "Cannot do another rep"],
    ["9", "Very Hard", "1 Rep left in the tank"],
    ["8", "Hard", "2 Reps left in the tank"],
    ["7", "Moderate", "Could do 3+ Reps"],
    ["6-", "Easy", "Warm-up, cardio, or skill work"],
];

const METRIC_DESCRIPTIONS: [&str; 5] = [
    "How hard was your main session?",
    "How closely did you stick to your diet?",
    "Did you hit your sleep target?",
    "Water intake, vitamin consistency",
    "Mental clarity, stress management",
];

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme) -> Result<()> {
    let sheet = super::new_sheet(workbook, RPE_GUIDE_SHEET)?;
    let mut w = SheetWriter::new(sheet, theme.secondary);

    w.put("A1", "RPE SCALE REFERENCE", &theme.title(16.0))?;
    w.merge("A1:C1")?;

    w.put(
        "A3",
        "Rate of Perceived Exertion (RPE) helps track workout intensity and fatigue.",
        &theme.normal(),
    )?;
    w.merge("A3:C3")?;

    w.row_values("A5", &["RPE", "Intensity", "Description"], &theme.column_header())?;

    let scale_style = theme.normal_bordered().with_alignment(theme.left());
    for (row, entry) in (6..).zip(RPE_SCALE.iter()) {
        w.row_values(&format!("A{row}"), entry, &scale_style)?;
    }

    w.put("A12", "DAILY RPE AUTO-CALCULATION", &theme.banner())?;
    w.merge("A12:C12")?;

    w.row_values("A14", &["Metric", "Score (1-10)", "Description"], &theme.column_header())?;

    let first = 15;
    let last = first + DAILY_METRICS.len() - 1;
    for (row, (metric, description)) in (first..).zip(DAILY_METRICS.iter().zip(METRIC_DESCRIPTIONS)) {
        w.put(&format!("A{row}"), *metric, &theme.normal_bordered())?;
        w.style(&format!("B{row}"), &theme.input())?;
        w.put(&format!("C{row}"), description, &theme.normal_bordered())?;
    }

    let total = last + 1;
    w.put(&format!("A{total}"), "TOTAL DAILY RPE", &theme.highlight())?;
    w.formula(
        &format!("B{total}"),
        &format!("=SUM(B{first}:B{last})"),
        &theme.highlight_cell(),
    )?;
    w.put(&format!("C{total}"), "Max 50", &theme.small())?;

    w.widths("A", "A", 25.0)?;
    w.widths("B", "B", 15.0)?;
    w.widths("C", "C", 40.0)?;

    tracing::debug!(sheet = RPE_GUIDE_SHEET, "built");
    Ok(())
}
