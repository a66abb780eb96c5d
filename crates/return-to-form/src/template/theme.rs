//! Color palettes and the cell styles built from them

use rtf_core::{
    Alignment, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle, HorizontalAlignment,
    Style, VerticalAlignment,
};

const FONT_NAME: &str = "Arial";

/// Colors used across every sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Display name, e.g. "Dark Knight"
    pub name: &'static str,
    /// Titles, subheaders, banner fill, overview and weekly tabs
    pub primary: Color,
    /// Small text and daily tabs
    pub secondary: Color,
    /// Column header fill
    pub medium_bg: Color,
    /// Header and body text, borders
    pub light_text: Color,
    /// Formula and total cells, metrics and summary tabs
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::DARK_KNIGHT
    }
}

impl Theme {
    pub const DARK_KNIGHT: Theme = Theme {
        name: "Dark Knight",
        primary: Color::rgb(0xD4, 0xAF, 0x37),
        secondary: Color::rgb(0x8B, 0x9D, 0xC3),
        medium_bg: Color::rgb(0x1A, 0x1A, 0x1A),
        light_text: Color::WHITE,
        accent: Color::rgb(0x00, 0xD4, 0xFF),
    };

    pub const CRIMSON_RED: Theme = Theme {
        name: "Crimson Red",
        primary: Color::rgb(0xDC, 0x26, 0x26),
        secondary: Color::rgb(0xFC, 0xA5, 0xA5),
        medium_bg: Color::rgb(0x19, 0x0A, 0x0A),
        light_text: Color::rgb(0xFE, 0xE2, 0xE2),
        accent: Color::rgb(0xEF, 0x44, 0x44),
    };

    pub const SPECIAL_OPS: Theme = Theme {
        name: "Special Ops",
        primary: Color::rgb(0x22, 0xC5, 0x5E),
        secondary: Color::rgb(0x86, 0xEF, 0xAC),
        medium_bg: Color::rgb(0x0F, 0x19, 0x14),
        light_text: Color::rgb(0xDC, 0xFC, 0xE7),
        accent: Color::rgb(0x4A, 0xDE, 0x80),
    };

    pub const ARCTIC_BLUE: Theme = Theme {
        name: "Arctic Blue",
        primary: Color::rgb(0x3B, 0x82, 0xF6),
        secondary: Color::rgb(0x93, 0xC5, 0xFD),
        medium_bg: Color::rgb(0x0F, 0x17, 0x2A),
        light_text: Color::rgb(0xE2, 0xE8, 0xF0),
        accent: Color::rgb(0x60, 0xA5, 0xFA),
    };

    // === Fonts ===

    fn font(&self, size: f64, bold: bool, color: Color) -> FontStyle {
        FontStyle::new()
            .with_name(FONT_NAME)
            .with_size(size)
            .with_bold(bold)
            .with_color(color)
    }

    pub fn header_font(&self) -> FontStyle {
        self.font(14.0, true, self.light_text)
    }

    pub fn subheader_font(&self) -> FontStyle {
        self.font(12.0, true, self.primary)
    }

    pub fn normal_font(&self) -> FontStyle {
        self.font(10.0, false, self.light_text)
    }

    pub fn small_font(&self) -> FontStyle {
        self.font(9.0, false, self.secondary)
    }

    /// Sheet title; the size varies per sheet
    pub fn title_font(&self, size: f64) -> FontStyle {
        self.font(size, true, self.primary)
    }

    /// Formula results and totals
    pub fn highlight_font(&self) -> FontStyle {
        self.font(10.0, true, self.accent)
    }

    // === Fills, alignment, border ===

    pub fn subheader_fill(&self) -> FillStyle {
        FillStyle::solid(self.medium_bg)
    }

    pub fn accent_fill(&self) -> FillStyle {
        FillStyle::solid(self.primary)
    }

    pub fn center(&self) -> Alignment {
        Alignment::new()
            .with_horizontal(HorizontalAlignment::Center)
            .with_vertical(VerticalAlignment::Center)
            .with_wrap(true)
    }

    pub fn left(&self) -> Alignment {
        Alignment::new()
            .with_horizontal(HorizontalAlignment::Left)
            .with_vertical(VerticalAlignment::Center)
            .with_wrap(true)
    }

    /// Free-text prompt areas
    pub fn top_left(&self) -> Alignment {
        Alignment::new()
            .with_horizontal(HorizontalAlignment::Left)
            .with_vertical(VerticalAlignment::Top)
            .with_wrap(true)
    }

    pub fn thin_border(&self) -> BorderStyle {
        BorderStyle::all(BorderLineStyle::Thin, self.light_text)
    }

    // === Composite cell styles ===

    pub fn title(&self, size: f64) -> Style {
        Style::new().with_font(self.title_font(size))
    }

    pub fn header(&self) -> Style {
        Style::new().with_font(self.header_font())
    }

    /// Section banner: header text on the gold fill
    pub fn banner(&self) -> Style {
        self.header().with_fill(self.accent_fill())
    }

    pub fn subheader(&self) -> Style {
        Style::new().with_font(self.subheader_font())
    }

    /// Table column heading
    pub fn column_header(&self) -> Style {
        self.subheader()
            .with_fill(self.subheader_fill())
            .with_alignment(self.center())
    }

    pub fn normal(&self) -> Style {
        Style::new().with_font(self.normal_font())
    }

    pub fn normal_bordered(&self) -> Style {
        self.normal().with_border(self.thin_border())
    }

    pub fn small(&self) -> Style {
        Style::new().with_font(self.small_font())
    }

    pub fn highlight(&self) -> Style {
        Style::new().with_font(self.highlight_font())
    }

    /// Formula or total cell
    pub fn highlight_cell(&self) -> Style {
        self.highlight()
            .with_border(self.thin_border())
            .with_alignment(self.center())
    }

    pub fn bordered(&self) -> Style {
        Style::new().with_border(self.thin_border())
    }

    /// Empty box the user types into
    pub fn input(&self) -> Style {
        self.bordered().with_alignment(self.center())
    }

    /// Large merged free-text area
    pub fn prompt(&self) -> Style {
        self.normal_bordered().with_alignment(self.top_left())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_palette() {
        let theme = Theme::default();
        assert_eq!(theme.primary.to_hex(), "D4AF37");
        assert_eq!(theme.secondary.to_hex(), "8B9DC3");
        assert_eq!(theme.accent.to_hex(), "00D4FF");
    }

    #[test]
    fn test_palettes_distinct() {
        let all = [
            Theme::DARK_KNIGHT,
            Theme::CRIMSON_RED,
            Theme::SPECIAL_OPS,
            Theme::ARCTIC_BLUE,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.primary, b.primary);
                assert_ne!(a.accent, b.accent);
            }
        }
    }

    #[test]
    fn test_fonts_are_arial() {
        let theme = Theme::default();
        for font in [
            theme.header_font(),
            theme.subheader_font(),
            theme.normal_font(),
            theme.small_font(),
            theme.title_font(20.0),
            theme.highlight_font(),
        ] {
            assert_eq!(font.name, "Arial");
        }
        assert_eq!(theme.title_font(14.0).size, 14.0);
        assert!(theme.highlight_font().bold);
    }

    #[test]
    fn test_banner_combines_header_and_accent_fill() {
        let theme = Theme::default();
        let banner = theme.banner();
        assert_eq!(banner.font, theme.header_font());
        assert_eq!(banner.fill, FillStyle::solid(theme.primary));
    }
}
