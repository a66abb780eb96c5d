//! `Week {w}`: habits, recovery tracker, weekly review

use rtf_core::Workbook;

use super::layout::SheetWriter;
use super::{weekly_sheet_name, Theme};
use crate::Result;

const DAY_INITIALS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

const TRACKED_HABITS: [&str; 4] = [
    "Sleep Goal Reached (7.5 hrs)",
    "Nutrition Compliant",
    "Hydration Target Met",
    "Mindset/Meditation/Reading",
];

pub(crate) fn build(workbook: &mut Workbook, theme: &Theme, week: u32) -> Result<()> {
    let name = weekly_sheet_name(week);
    let sheet = super::new_sheet(workbook, &name)?;
    let mut w = SheetWriter::new(sheet, theme.primary);

    w.put("A1", format!("WEEK {week} LOG - THE CORE"), &theme.title(16.0))?;
    w.merge("A1:H1")?;

    w.put("A3", "PRIMARY FOCUS:", &theme.header())?;
    w.merge("B3:H3")?;
    w.style("B3", &theme.bordered())?;

    let section = theme.subheader().with_fill(theme.subheader_fill());
    w.put("A5", "DAILY HABITS/NON-NEGOTIABLES", &section)?;
    w.merge("A5:H5")?;

    w.row_values("A6", &["Habit 1", "Habit 2", "Habit 3", "Habit 4"], &theme.normal())?;
    w.row_values("A7", &["✓ or ✗"; 4], &theme.input())?;

    w.put("A9", "HABIT & RECOVERY TRACKER", &theme.banner())?;
    w.merge("A9:H9")?;

    w.put("A10", "HABIT / FOCUS", &section)?;
    w.row_values("B10", &DAY_INITIALS, &theme.column_header())?;

    for (row, habit) in (11..).zip(TRACKED_HABITS) {
        w.put(&format!("A{row}"), habit, &theme.normal_bordered())?;
        w.row_values(&format!("B{row}"), &["☐"; 7], &theme.input())?;
    }

    w.put("A15", "TOTAL WORKOUTS COMPLETED", &theme.highlight())?;
    w.merge("B15:H15")?;
    w.put("B15", "e.g., 5/7", &theme.input())?;

    w.put("A17", "WEEKLY REVIEW & STRATEGY", &theme.banner())?;
    w.merge("A17:H17")?;

    w.merge("A18:H21")?;
    w.put(
        "A18",
        "What went right? What went wrong? What is the 1 adjustment for next week?",
        &theme.prompt(),
    )?;
    w.height(18, 80.0);

    w.widths("A", "A", 30.0)?;
    w.widths("B", "H", 12.0)?;

    tracing::debug!(sheet = %name, "built");
    Ok(())
}
