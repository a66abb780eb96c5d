//! Style pool for deduplication

use super::Style;
use ahash::AHashMap;

/// Deduplicating store of the styles used by one worksheet
///
/// Cells reference styles by index. Index 0 is always the default style and
/// indices follow first-insertion order, so the same sequence of
/// `get_or_insert` calls always yields the same indices.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    index_map: AHashMap<Style, u32>,
}

impl StylePool {
    /// Pool holding only the default style
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::with_capacity(32),
            index_map: AHashMap::with_capacity(32),
        };
        pool.get_or_insert(Style::default());
        pool
    }

    /// Index of `style`, adding it when not yet present
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }
        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Style by index
    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    /// Number of styles, default included
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True when only the default style is present
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }

    /// Styles with their indices, in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        self.styles.iter().enumerate().map(|(i, s)| (i as u32, s))
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderLineStyle, BorderStyle, Color};

    #[test]
    fn test_default_style() {
        let pool = StylePool::new();
        assert_eq!(pool.len(), 1);
        assert!(pool.is_empty());
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn test_deduplication() {
        let mut pool = StylePool::new();

        let bordered = Style::new().with_border(BorderStyle::all(BorderLineStyle::Thin, Color::WHITE));
        let a = pool.get_or_insert(bordered.clone());
        let b = pool.get_or_insert(Style::new().bold(true));
        let c = pool.get_or_insert(bordered);

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(a, c);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get_or_insert(Style::default()), 0);
    }
}
