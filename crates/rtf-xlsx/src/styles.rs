//! styles.xml read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use rtf_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, Style, VerticalAlignment,
};
use rtf_core::Workbook;

// === Writing ===

/// Workbook-wide cell formats built from every sheet's style pool
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Deduplicated styles; the index is the cellXfs id
    styles: Vec<Style>,
    /// Per sheet: local pool index -> cellXfs id
    sheet_maps: Vec<Vec<u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();
        style_to_xf.insert(Style::default(), 0);

        let sheet_maps = workbook
            .worksheets()
            .map(|sheet| {
                sheet
                    .style_pool()
                    .iter()
                    .map(|(_, style)| {
                        *style_to_xf.entry(style.clone()).or_insert_with(|| {
                            styles.push(style.clone());
                            (styles.len() - 1) as u32
                        })
                    })
                    .collect()
            })
            .collect();

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(local_style_index as usize).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = vec![FontStyle::default()];
        // the first two fills are reserved: none and gray125
        let mut fills = vec![FillStyle::None, FillStyle::None];
        let mut borders = vec![BorderStyle::default()];

        let resolved: Vec<ResolvedXfIds> = self
            .styles
            .iter()
            .map(|style| ResolvedXfIds {
                font_id: intern(&mut fonts, &style.font, 0),
                fill_id: match style.fill {
                    FillStyle::None => 0,
                    fill => intern(&mut fills, &fill, 2),
                },
                border_id: intern(&mut borders, &style.border, 0),
            })
            .collect();

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
        xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for fill in &fills[2..] {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

/// Index of `item` in `table`, searching from `from`; appended when absent
fn intern<T: PartialEq + Clone>(table: &mut Vec<T>, item: &T, from: usize) -> usize {
    match table.iter().skip(from).position(|t| t == item) {
        Some(pos) => pos + from,
        None => {
            table.push(item.clone());
            table.len() - 1
        }
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} indexed=\"64\"/>"),
        Color::Rgb { .. } => format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex()),
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        Some(e) if e.style != BorderLineStyle::None => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            e.style.as_str(),
            write_color("color", &e.color)
        ),
        _ => format!("<{tag}/>"),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.border.is_empty() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let head = format!(
        "<xf numFmtId=\"0\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    if style.alignment.is_default() {
        format!("{}/>", head)
    } else {
        format!("{}>{}</xf>", head, write_alignment(&style.alignment))
    }
}

// === Reading ===

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

/// Parse styles.xml into one [`Style`] per cellXfs entry
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut xfs: Vec<(usize, usize, usize, Alignment)> = Vec::new();

    let mut section = Section::Other;
    let mut font = FontStyle::default();
    let mut fill = FillStyle::None;
    let mut solid = false;
    let mut border = BorderStyle::default();
    let mut edge: Option<(&'static str, BorderLineStyle)> = None;
    let mut xf: Option<(usize, usize, usize, Alignment)> = None;

    let mut buf = Vec::new();
    loop {
        let event = xml_reader.read_event_into(&mut buf)?;
        let is_empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match (section, e.name().as_ref()) {
                (_, b"fonts") => section = Section::Fonts,
                (_, b"fills") => section = Section::Fills,
                (_, b"borders") => section = Section::Borders,
                (_, b"cellXfs") => section = Section::CellXfs,

                (Section::Fonts, b"font") => font = FontStyle::default(),
                (Section::Fonts, b"b") => font.bold = bool_attr(e, b"val").unwrap_or(true),
                (Section::Fonts, b"i") => font.italic = bool_attr(e, b"val").unwrap_or(true),
                (Section::Fonts, b"sz") => {
                    if let Some(size) = attr(e, b"val").and_then(|s| s.parse().ok()) {
                        font.size = size;
                    }
                }
                (Section::Fonts, b"name") => {
                    if let Some(name) = attr(e, b"val") {
                        font.name = name;
                    }
                }
                (Section::Fonts, b"color") => font.color = parse_color(e),

                (Section::Fills, b"fill") => {
                    fill = FillStyle::None;
                    solid = false;
                }
                (Section::Fills, b"patternFill") => {
                    solid = attr(e, b"patternType").as_deref() == Some("solid");
                }
                (Section::Fills, b"fgColor") if solid => fill = FillStyle::solid(parse_color(e)),

                (Section::Borders, b"border") => border = BorderStyle::default(),
                (Section::Borders, tag @ (b"left" | b"right" | b"top" | b"bottom")) => {
                    let name = edge_name(tag);
                    let style = attr(e, b"style")
                        .and_then(|s| BorderLineStyle::parse(&s))
                        .unwrap_or_default();
                    if is_empty {
                        set_edge(&mut border, name, style, Color::Auto);
                    } else {
                        edge = Some((name, style));
                    }
                }
                (Section::Borders, b"color") => {
                    if let Some((name, style)) = edge.take() {
                        set_edge(&mut border, name, style, parse_color(e));
                    }
                }

                (Section::CellXfs, b"xf") => {
                    let id = |key: &[u8]| {
                        attr(e, key)
                            .and_then(|s| s.parse::<usize>().ok())
                            .unwrap_or(0)
                    };
                    let entry = (id(b"fontId"), id(b"fillId"), id(b"borderId"), Alignment::default());
                    if is_empty {
                        xfs.push(entry);
                    } else {
                        xf = Some(entry);
                    }
                }
                (Section::CellXfs, b"alignment") => {
                    if let Some(entry) = xf.as_mut() {
                        entry.3 = parse_alignment(e);
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match (section, e.name().as_ref()) {
                (_, b"fonts" | b"fills" | b"borders" | b"cellXfs") => section = Section::Other,
                (Section::Fonts, b"font") => fonts.push(std::mem::take(&mut font)),
                (Section::Fills, b"fill") => fills.push(fill),
                (Section::Borders, tag @ (b"left" | b"right" | b"top" | b"bottom")) => {
                    // edge with a style but no color child
                    if let Some((name, style)) = edge.take() {
                        debug_assert_eq!(name, edge_name(tag));
                        set_edge(&mut border, name, style, Color::Auto);
                    }
                }
                (Section::Borders, b"border") => borders.push(std::mem::take(&mut border)),
                (Section::CellXfs, b"xf") => {
                    if let Some(entry) = xf.take() {
                        xfs.push(entry);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let styles = xfs
        .into_iter()
        .map(|(font_id, fill_id, border_id, alignment)| {
            Ok(Style {
                font: fonts
                    .get(font_id)
                    .cloned()
                    .ok_or_else(|| XlsxError::Parse(format!("fontId {} out of range", font_id)))?,
                fill: fills.get(fill_id).copied().unwrap_or_default(),
                border: borders.get(border_id).copied().ok_or_else(|| {
                    XlsxError::Parse(format!("borderId {} out of range", border_id))
                })?,
                alignment,
            })
        })
        .collect::<XlsxResult<Vec<_>>>()?;

    if styles.is_empty() {
        return Ok(vec![Style::default()]);
    }
    Ok(styles)
}

pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn bool_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    attr(e, key).map(|v| v == "1" || v == "true")
}

pub(crate) fn parse_color(e: &BytesStart<'_>) -> Color {
    attr(e, b"rgb")
        .and_then(|rgb| Color::from_hex(&rgb))
        .unwrap_or_default()
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    let mut al = Alignment::default();
    if let Some(h) = attr(e, b"horizontal").and_then(|s| HorizontalAlignment::parse(&s)) {
        al.horizontal = h;
    }
    if let Some(v) = attr(e, b"vertical").and_then(|s| VerticalAlignment::parse(&s)) {
        al.vertical = v;
    }
    al.wrap_text = bool_attr(e, b"wrapText").unwrap_or(false);
    al
}

fn edge_name(tag: &[u8]) -> &'static str {
    match tag {
        b"left" => "left",
        b"right" => "right",
        b"top" => "top",
        _ => "bottom",
    }
}

fn set_edge(border: &mut BorderStyle, name: &str, style: BorderLineStyle, color: Color) {
    let edge = (style != BorderLineStyle::None).then(|| BorderEdge::new(style, color));
    match name {
        "left" => border.left = edge,
        "right" => border.right = edge,
        "top" => border.top = edge,
        _ => border.bottom = edge,
    }
}
