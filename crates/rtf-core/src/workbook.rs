//! Workbook type - the document root

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

const INVALID_SHEET_NAME_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];

/// Document metadata written to `docProps/core.xml`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentProperties {
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Author
    pub creator: Option<String>,
    /// Creation timestamp; left out of the file when `None`
    pub created: Option<DateTime<Utc>>,
}

/// An ordered collection of uniquely named worksheets
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    properties: DocumentProperties,
}

impl Workbook {
    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// True when there are no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Index of a worksheet by exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Worksheets in order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Worksheets in order, mutably
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Append a worksheet and return its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;
        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));
        Ok(index)
    }

    /// Document properties
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Mutable document properties
    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    /// Check a new sheet name against the naming rules and the existing sheets
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        // spreadsheet applications count UTF-16 code units
        if name.encode_utf16().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "{:?} is longer than {} characters",
                name, MAX_SHEET_NAME_LEN
            )));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SHEET_NAME_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "{:?} contains '{}'",
                name, c
            )));
        }

        let name_lower = name.to_lowercase();
        let duplicate = self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower);
        if duplicate {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_worksheets_in_order() {
        let mut wb = Workbook::empty();
        assert!(wb.is_empty());

        assert_eq!(wb.add_worksheet_with_name("Week 1").unwrap(), 0);
        assert_eq!(wb.add_worksheet_with_name("W1D1").unwrap(), 1);

        let names: Vec<_> = wb.worksheets().map(|ws| ws.name()).collect();
        assert_eq!(names, vec!["Week 1", "W1D1"]);
        assert_eq!(wb.sheet_index("W1D1"), Some(1));
    }

    #[test]
    fn test_duplicate_names_case_insensitive() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Week 1").unwrap();

        let err = wb.add_worksheet_with_name("WEEK 1").unwrap_err();
        assert!(matches!(err, Error::DuplicateSheetName(_)));
    }

    #[test]
    fn test_invalid_names() {
        let mut wb = Workbook::empty();
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Week 1/2").is_err());
        assert!(wb.add_worksheet_with_name("[draft]").is_err());
        assert!(wb.add_worksheet_with_name(&"x".repeat(32)).is_err());
        assert!(wb.add_worksheet_with_name(&"x".repeat(31)).is_ok());
    }

    #[test]
    fn test_emoji_names_count_utf16_units() {
        let mut wb = Workbook::empty();
        // one character, two UTF-16 code units
        let too_long = format!("🏆{}", "x".repeat(30));
        assert_eq!(too_long.chars().count(), 31);
        let err = wb.add_worksheet_with_name(&too_long).unwrap_err();
        assert!(matches!(err, Error::InvalidSheetName(_)));

        let longest = format!("🏆{}", "x".repeat(29));
        assert!(wb.add_worksheet_with_name(&longest).is_ok());
        assert!(wb.add_worksheet_with_name("📋 OVERVIEW").is_ok());
    }
}
