//! `📋 OVERVIEW`: goal entry and navigation table

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{PlanConfig, Theme, METRICS_SHEET, OVERVIEW_SHEET, RPE_GUIDE_SHEET, SUMMARY_SHEET};
use crate::Result;

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme, plan: &PlanConfig) -> Result<()> {
    let sheet = super::new_sheet(workbook, OVERVIEW_SHEET)?;
    let mut w = SheetWriter::new(sheet, theme.primary);
    let n = plan.weeks;

    let title = theme.title(20.0).with_alignment(theme.center());
    w.put("A1", "RETURN TO FORM - ULTIMATE EDITION", &title)?;
    w.merge("A1:H1")?;

    let tagline = theme.subheader().with_alignment(theme.center());
    w.put(
        "A3",
        format!("157+ Pages • {n} Weeks • Science-Backed Training"),
        &tagline,
    )?;
    w.merge("A3:H3")?;

    w.put("A5", "PRIMARY GOAL:", &theme.header())?;
    w.style("B5", &theme.normal())?;
    w.merge("B5:H5")?;

    w.put("A7", "SECONDARY METRIC (e.g., Weight, Lift PR):", &theme.header())?;
    w.plain("B7", "Starting Value:")?;
    w.style("C7", &theme.normal())?;
    w.plain("D7", "Target Value:")?;
    w.style("E7", &theme.normal())?;

    w.put("A10", "NAVIGATION - QUICK LINKS", &theme.banner())?;
    w.merge("A10:H10")?;

    w.row_values("A11", &["Section", "Sheet Name", "Description"], &theme.column_header())?;

    let week_logs = format!("Week 1-{n} Logs");
    let week_tabs = format!("Week 1-{n} tabs");
    let review = format!("{n}-week review and results");
    let nav_items: [[&str; 3]; 4] = [
        ["Core Metrics", METRICS_SHEET, "Starting measurements and progress photos"],
        ["RPE Reference", RPE_GUIDE_SHEET, "Rate of Perceived Exertion scale"],
        [&week_logs, &week_tabs, "Weekly objectives and daily workout logs"],
        ["Final Summary", SUMMARY_SHEET, &review],
    ];
    for (row, item) in (12..).zip(nav_items.iter()) {
        w.row_values(&format!("A{row}"), item, &theme.normal_bordered())?;
    }

    w.widths("A", "B", 20.0)?;
    w.widths("C", "C", 50.0)?;
    w.widths("D", "H", 15.0)?;

    tracing::debug!(sheet = OVERVIEW_SHEET, "built");
    Ok(())
}
