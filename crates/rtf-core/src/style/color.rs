//! Color representation

use std::fmt;

/// Cell color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Application default color
    #[default]
    Auto,

    /// Opaque RGB color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Black
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// White
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    ///
    /// The alpha byte is ignored; XLSX colors in this workbook are opaque.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let rgb = match hex.len() {
            6 => hex,
            8 => hex.get(2..)?,
            _ => return None,
        };
        let channel = |i: usize| {
            rgb.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
        };
        Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `RRGGBB` form
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    /// `AARRGGBB` form as used by SpreadsheetML `rgb` attributes
    pub fn to_argb_hex(&self) -> String {
        format!("FF{}", self.to_hex())
    }

    /// RGB channels; `Auto` resolves to black
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } => (*r, *g, *b),
        }
    }

    /// True for [`Color::Auto`]
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => f.write_str("auto"),
            Color::Rgb { .. } => write!(f, "#{}", self.to_hex()),
        }
    }
}
