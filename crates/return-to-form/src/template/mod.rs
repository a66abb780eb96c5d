//! Workbook template: plan configuration and the sheet builders
//!
//! Sheets are built in tab order into one in-memory [`Workbook`]:
//! Overview, Metrics, RPE Guide, then for each week its weekly log followed
//! by seven daily logs, then the Summary.

mod daily;
mod layout;
mod metrics;
mod overview;
mod rpe_guide;
mod summary;
mod theme;
mod weekly;

pub use theme::Theme;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rtf_core::{Workbook, Worksheet};
use crate::{Result, TemplateError, WorkbookExt};

pub const OVERVIEW_SHEET: &str = "📋 OVERVIEW";
pub const METRICS_SHEET: &str = "📊 METRICS";
pub const RPE_GUIDE_SHEET: &str = "🔥 RPE GUIDE";
pub const SUMMARY_SHEET: &str = "🏆 SUMMARY";

/// Week count used when none is given
pub const DEFAULT_WEEKS: u32 = 12;
/// Largest supported plan: one year
pub const MAX_WEEKS: u32 = 52;

/// Sheets that do not depend on the week count
pub const FIXED_SHEET_COUNT: usize = 4;
/// Weekly log plus seven daily logs
pub const SHEETS_PER_WEEK: usize = 8;

pub(crate) const DAY_NAMES: [&str; 7] = [
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

/// Scored 1-10 each day and summed into the daily RPE total
pub(crate) const DAILY_METRICS: [&str; 5] = [
    "Workout Intensity",
    "Nutrition Adherence",
    "Sleep Quality",
    "Hydration/Supplements",
    "Mindset/Focus",
];

/// What to generate and where to put it
#[derive(Debug, Clone, PartialEq)]
pub struct PlanConfig {
    /// Number of training weeks
    pub weeks: u32,
    /// Directory the workbook is written to
    pub output_dir: PathBuf,
    /// Full output path; overrides `output_dir` and the derived file name
    pub output: Option<PathBuf>,
    /// Document title property
    pub title: String,
    /// Document creator property
    pub creator: String,
    /// Creation timestamp property; `None` keeps output byte-stable
    pub created: Option<DateTime<Utc>>,
    /// Palette for fonts, fills and tab colors
    pub theme: Theme,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            weeks: DEFAULT_WEEKS,
            output_dir: PathBuf::from("."),
            output: None,
            title: "Return to Form - Ultimate Edition".to_string(),
            creator: "Return to Form".to_string(),
            created: None,
            theme: Theme::default(),
        }
    }
}

impl PlanConfig {
    /// Default plan with a different week count
    pub fn with_weeks(weeks: u32) -> Self {
        Self {
            weeks,
            ..Self::default()
        }
    }

    /// Reject week counts outside `1..=52`
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WEEKS).contains(&self.weeks) {
            return Err(TemplateError::InvalidPlan(format!(
                "weeks must be between 1 and {}, got {}",
                MAX_WEEKS, self.weeks
            )));
        }
        Ok(())
    }

    /// `Return_to_Form_Ultimate_Edition_{N}Weeks_GoogleSheets.xlsx`
    pub fn file_name(&self) -> String {
        format!(
            "Return_to_Form_Ultimate_Edition_{}Weeks_GoogleSheets.xlsx",
            self.weeks
        )
    }

    /// Where [`generate`] writes the workbook
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.output_dir.join(self.file_name()),
        }
    }

    /// Number of sheets the plan produces
    pub fn sheet_count(&self) -> usize {
        self.weeks as usize * SHEETS_PER_WEEK + FIXED_SHEET_COUNT
    }

    /// Sheet names in tab order
    pub fn sheet_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.sheet_count());
        names.extend([OVERVIEW_SHEET, METRICS_SHEET, RPE_GUIDE_SHEET].map(String::from));
        for week in 1..=self.weeks {
            names.push(weekly_sheet_name(week));
            names.extend((1..=7).map(|day| daily_sheet_name(week, day)));
        }
        names.push(SUMMARY_SHEET.to_string());
        names
    }
}

pub fn weekly_sheet_name(week: u32) -> String {
    format!("Week {week}")
}

pub fn daily_sheet_name(week: u32, day: u32) -> String {
    format!("W{week}D{day}")
}

/// Result of [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub path: PathBuf,
    pub sheet_count: usize,
}

/// Build the complete workbook in memory
pub fn build_workbook(plan: &PlanConfig) -> Result<Workbook> {
    plan.validate()?;
    let span = tracing::info_span!("build_workbook", weeks = plan.weeks, theme = plan.theme.name);
    let _guard = span.enter();

    let theme = plan.theme;
    let mut workbook = Workbook::empty();
    {
        let props = workbook.properties_mut();
        props.title = Some(plan.title.clone());
        props.subject = Some(format!("{}-week training log", plan.weeks));
        props.creator = Some(plan.creator.clone());
        props.created = plan.created;
    }

    overview::build(&mut workbook, &theme, plan)?;
    metrics::build(&mut workbook, &theme, plan)?;
    rpe_guide::build(&mut workbook, &theme)?;

    for week in 1..=plan.weeks {
        weekly::build(&mut workbook, &theme, week)?;
        for day in 1..=DAY_NAMES.len() as u32 {
            daily::build(&mut workbook, &theme, week, day)?;
        }
        tracing::info!(week, "week built");
    }

    summary::build(&mut workbook, &theme, plan)?;

    tracing::info!(sheets = workbook.sheet_count(), "workbook built");
    Ok(workbook)
}

/// Build the workbook and write it to [`PlanConfig::output_path`]
pub fn generate(plan: &PlanConfig) -> Result<GenerateReport> {
    let workbook = build_workbook(plan)?;
    let path = plan.output_path();
    workbook.save(&path)?;

    tracing::info!(path = %path.display(), sheets = workbook.sheet_count(), "workbook saved");
    Ok(GenerateReport {
        path,
        sheet_count: workbook.sheet_count(),
    })
}

/// Append a sheet and hand back a mutable reference to it
pub(crate) fn new_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> Result<&'a mut Worksheet> {
    let idx = workbook.add_worksheet_with_name(name)?;
    let count = workbook.sheet_count();
    workbook
        .worksheet_mut(idx)
        .ok_or_else(|| rtf_core::Error::SheetOutOfBounds(idx, count).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_plan() {
        let plan = PlanConfig::default();
        assert_eq!(plan.weeks, 12);
        assert_eq!(plan.sheet_count(), 100);
        assert_eq!(
            plan.output_path(),
            PathBuf::from(".").join("Return_to_Form_Ultimate_Edition_12Weeks_GoogleSheets.xlsx")
        );
    }

    #[test]
    fn test_output_override() {
        let plan = PlanConfig {
            output: Some(PathBuf::from("/tmp/plan.xlsx")),
            ..PlanConfig::default()
        };
        assert_eq!(plan.output_path(), PathBuf::from("/tmp/plan.xlsx"));
    }

    #[test]
    fn test_week_bounds() {
        assert!(PlanConfig::with_weeks(0).validate().is_err());
        assert!(PlanConfig::with_weeks(53).validate().is_err());
        assert!(PlanConfig::with_weeks(1).validate().is_ok());
        assert!(PlanConfig::with_weeks(52).validate().is_ok());
    }

    #[test]
    fn test_sheet_names_order() {
        let names = PlanConfig::with_weeks(2).sheet_names();
        assert_eq!(names.len(), 20);
        assert_eq!(&names[..5], &["📋 OVERVIEW", "📊 METRICS", "🔥 RPE GUIDE", "Week 1", "W1D1"]);
        assert_eq!(names[11], "Week 2");
        assert_eq!(names[18], "W2D7");
        assert_eq!(names[19], "🏆 SUMMARY");
    }

    #[test]
    fn test_built_names_match_plan() {
        let plan = PlanConfig::with_weeks(3);
        let workbook = build_workbook(&plan).unwrap();
        let built: Vec<String> = workbook.worksheets().map(|s| s.name().to_string()).collect();
        assert_eq!(built, plan.sheet_names());
    }

    #[test]
    fn test_theme_colors_tabs_and_titles() {
        let plan = PlanConfig {
            theme: Theme::CRIMSON_RED,
            ..PlanConfig::with_weeks(1)
        };
        let crimson = build_workbook(&plan).unwrap();
        let default = build_workbook(&PlanConfig::with_weeks(1)).unwrap();

        for (name, color) in [
            (OVERVIEW_SHEET, Theme::CRIMSON_RED.primary),
            (METRICS_SHEET, Theme::CRIMSON_RED.accent),
            ("W1D1", Theme::CRIMSON_RED.secondary),
        ] {
            let sheet = crimson.worksheet_by_name(name).unwrap();
            assert_eq!(sheet.tab_color(), Some(color));
            assert_ne!(sheet.tab_color(), default.worksheet_by_name(name).unwrap().tab_color());
        }

        let title = |wb: &Workbook| {
            wb.worksheet_by_name(OVERVIEW_SHEET)
                .unwrap()
                .cell_style("A1")
                .unwrap()
                .unwrap()
                .font
                .color
        };
        assert_eq!(title(&crimson), Theme::CRIMSON_RED.primary);
        assert_eq!(title(&default), Theme::DARK_KNIGHT.primary);
    }

    #[test]
    fn test_invalid_plan_builds_nothing() {
        let err = build_workbook(&PlanConfig::with_weeks(0)).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPlan(_)));
    }
}
