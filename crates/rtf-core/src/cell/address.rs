//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address such as `B4` or `$C$17`
///
/// Rows and columns are 0-based internally and 1-based / lettered when
/// formatted. The `$` markers only matter to formula text; two addresses that
/// point at the same cell with different markers are still different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based, A=0)
    pub col: u16,
    /// `$` before the row number
    pub row_absolute: bool,
    /// `$` before the column letters
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a relative address from 0-based indices
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create an address with explicit absolute markers
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse an A1-style address
    ///
    /// ```
    /// use rtf_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("D9").unwrap();
    /// assert_eq!((addr.row, addr.col), (8, 3));
    ///
    /// let addr = CellAddress::parse("$B$17").unwrap();
    /// assert!(addr.row_absolute && addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let (col_absolute, rest) = match s.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if letters_end == 0 {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }
        let col = Self::letters_to_column(&rest[..letters_end])?;

        let rest = &rest[letters_end..];
        let (row_absolute, digits) = match rest.strip_prefix('$') {
            Some(digits) => (true, digits),
            None => (false, rest),
        };
        if digits.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        if row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(row - 1, MAX_ROWS - 1));
        }

        Ok(Self::with_absolute(row - 1, col, row_absolute, col_absolute))
    }

    /// Convert a 0-based column index to letters (0 = A, 26 = AA)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::new();
        let mut n = col as u32 + 1;
        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }
        letters.reverse();
        String::from_utf8(letters).unwrap_or_default()
    }

    /// Convert column letters to a 0-based index (A = 0, AA = 26)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(
                    (col - 1).min(u16::MAX as u32) as u16,
                    MAX_COLS - 1,
                ));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as an A1-style string, keeping `$` markers
    pub fn to_a1_string(&self) -> String {
        format!(
            "{}{}{}{}",
            if self.col_absolute { "$" } else { "" },
            Self::column_to_letters(self.col),
            if self.row_absolute { "$" } else { "" },
            self.row + 1
        )
    }

    /// Same cell with both `$` markers dropped
    pub fn relative(&self) -> Self {
        Self::new(self.row, self.col)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells such as `A18:H21`
///
/// Always normalized so `start` is the top-left and `end` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Create a range from two corners in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        let (top, bottom) = if a.row <= b.row { (a, b) } else { (b, a) };
        let (left_col, right_col) = if a.col <= b.col {
            (a.col, b.col)
        } else {
            (b.col, a.col)
        };

        Self {
            start: CellAddress::with_absolute(
                top.row,
                left_col,
                top.row_absolute,
                top.col_absolute,
            ),
            end: CellAddress::with_absolute(
                bottom.row,
                right_col,
                bottom.row_absolute,
                bottom.col_absolute,
            ),
        }
    }

    /// Create a range from 0-based indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// A range covering one cell
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse `A1:B2` (or a lone `A1`)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => {
                if end.contains(':') {
                    return Err(Error::InvalidRange(s.to_string()));
                }
                Ok(Self::new(CellAddress::parse(start)?, CellAddress::parse(end)?))
            }
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Whether `addr` lies within the range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        (self.start.row..=self.end.row).contains(&addr.row)
            && (self.start.col..=self.end.col).contains(&addr.col)
    }

    /// Number of rows spanned
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns spanned
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Total number of cells
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Whether the two ranges share at least one cell
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// Iterate over the addresses in row-major order
    pub fn cells(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            row: self.start.row,
            col: self.start.col,
            remaining: self.cell_count() as usize,
        }
    }

    /// Format as `A1:B2`, or `A1` for a single cell
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over a [`CellRange`]
pub struct CellRangeIter {
    range: CellRange,
    row: u32,
    col: u16,
    remaining: usize,
}

impl Iterator for CellRangeIter {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let addr = CellAddress::new(self.row, self.col);
        self.remaining -= 1;

        if self.col == self.range.end.col {
            self.col = self.range.start.col;
            self.row += 1;
        } else {
            self.col += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for CellRangeIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(7), "H");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");

        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("h").unwrap(), 7);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);
        assert!(CellAddress::letters_to_column("XFE").is_err());
    }

    #[test]
    fn test_parse_address() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("F27").unwrap();
        assert_eq!((addr.row, addr.col), (26, 5));

        let addr = CellAddress::parse("$A17").unwrap();
        assert!(addr.col_absolute);
        assert!(!addr.row_absolute);
        assert_eq!(addr.to_string(), "$A17");

        let addr = CellAddress::parse("XFD1048576").unwrap();
        assert_eq!((addr.row, addr.col), (1_048_575, 16_383));
    }

    #[test]
    fn test_parse_address_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("B").is_err());
        assert!(CellAddress::parse("12").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1048577").is_err());
        assert!(CellAddress::parse("A1B").is_err());
    }

    #[test]
    fn test_range_parse_and_display() {
        let range = CellRange::parse("A18:H21").unwrap();
        assert_eq!(range.start, CellAddress::new(17, 0));
        assert_eq!(range.end, CellAddress::new(20, 7));
        assert_eq!(range.row_count(), 4);
        assert_eq!(range.col_count(), 8);
        assert_eq!(range.to_string(), "A18:H21");

        // Corners given in reverse are normalized
        let range = CellRange::parse("D8:A4").unwrap();
        assert_eq!(range.to_string(), "A4:D8");

        assert_eq!(CellRange::parse("C7").unwrap().to_string(), "C7");
        assert!(CellRange::parse("A1:B2:C3").is_err());
    }

    #[test]
    fn test_range_overlap() {
        let title = CellRange::parse("A1:H1").unwrap();
        let focus = CellRange::parse("B3:H3").unwrap();
        let review = CellRange::parse("A18:H21").unwrap();

        assert!(!title.overlaps(&focus));
        assert!(!focus.overlaps(&review));
        assert!(review.overlaps(&CellRange::parse("H21").unwrap()));
        assert!(review.overlaps(&CellRange::parse("C10:C18").unwrap()));
    }

    #[test]
    fn test_range_cells() {
        let range = CellRange::parse("B15:C16").unwrap();
        let cells: Vec<String> = range.cells().map(|a| a.to_string()).collect();
        assert_eq!(cells, vec!["B15", "C15", "B16", "C16"]);
        assert_eq!(range.cells().len(), 4);
        assert!(range.contains(&CellAddress::parse("C16").unwrap()));
        assert!(!range.contains(&CellAddress::parse("D16").unwrap()));
    }
}
