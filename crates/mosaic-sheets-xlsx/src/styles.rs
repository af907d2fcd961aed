//! XLSX styles (styles.xml) read/write helpers
//!
//! Mosaic workbooks only use the default cell format; everything visible
//! comes from the differential formats (dxfs) that conditional formatting
//! rules point at.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use mosaic_sheets_core::style::{Color, FillStyle, FontStyle, Style};
use mosaic_sheets_core::Workbook;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Deduplicated DXF styles; index is the dxfId
    dxf_styles: Vec<Style>,
    /// Mapping from (sheet_index, cf_rule_index) to dxf_id
    dxf_map: HashMap<(usize, usize), u32>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut dxf_styles: Vec<Style> = Vec::new();
        let mut dxf_map: HashMap<(usize, usize), u32> = HashMap::new();
        let mut dxf_style_to_id: HashMap<Style, u32> = HashMap::new();

        for (sheet_idx, sheet) in workbook.worksheets().enumerate() {
            for (rule_idx, rule) in sheet.conditional_formats().iter().enumerate() {
                if let Some(format) = rule.format {
                    let dxf_id = *dxf_style_to_id.entry(format).or_insert_with(|| {
                        dxf_styles.push(format);
                        (dxf_styles.len() - 1) as u32
                    });
                    dxf_map.insert((sheet_idx, rule_idx), dxf_id);
                }
            }
        }

        log::debug!(
            "style table: {} distinct dxf formats for {} rules",
            dxf_styles.len(),
            dxf_map.len()
        );

        Self {
            dxf_styles,
            dxf_map,
        }
    }

    /// Get the DXF ID for a conditional format rule, if it has a format defined
    pub(crate) fn dxf_id_for(&self, sheet_index: usize, rule_index: usize) -> Option<u32> {
        self.dxf_map.get(&(sheet_index, rule_index)).copied()
    }

    #[cfg(test)]
    pub(crate) fn dxf_styles(&self) -> &[Style] {
        &self.dxf_styles
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>"#,
        );

        // DXFs (differential formats for conditional formatting)
        if self.dxf_styles.is_empty() {
            xml.push_str("\n  <dxfs count=\"0\"/>");
        } else {
            xml.push_str(&format!("\n  <dxfs count=\"{}\">", self.dxf_styles.len()));
            for dxf_style in &self.dxf_styles {
                xml.push_str("\n    ");
                xml.push_str(&write_dxf(dxf_style));
            }
            xml.push_str("\n  </dxfs>");
        }

        xml.push_str(
            r#"
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} auto=\"1\"/>"),
        Color::Rgb { .. } | Color::Argb { .. } => {
            format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex())
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str("</font>");
    s
}

/// Solid fills carry the color as both fg and bg; spreadsheet applications
/// disagree on which one a dxf fill uses.
fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}{}</patternFill></fill>",
            write_color("fgColor", color),
            write_color("bgColor", color)
        ),
    }
}

/// Write a DXF (differential format) element for conditional formatting
fn write_dxf(style: &Style) -> String {
    let mut s = String::from("<dxf>");

    if !style.font.is_default() {
        s.push_str(&write_font(&style.font));
    }

    if !style.fill.is_none() {
        s.push_str(&write_fill(&style.fill));
    }

    s.push_str("</dxf>");
    s
}

// === Reading ===

/// Result of reading styles.xml
#[derive(Debug, Default)]
pub(crate) struct ParsedStyles {
    pub dxf_styles: Vec<Style>,
}

/// Fill state while inside a `<dxf><fill>`
#[derive(Debug, Default)]
struct FillState {
    pattern: Option<String>,
    fg: Option<Color>,
    bg: Option<Color>,
}

impl FillState {
    fn finish(self) -> FillStyle {
        if self.pattern.as_deref() == Some("none") {
            return FillStyle::None;
        }
        match self.bg.or(self.fg) {
            Some(color) if !color.is_auto() => FillStyle::solid(color),
            _ => FillStyle::None,
        }
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<ParsedStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parsed = ParsedStyles::default();

    let mut in_dxfs = false;
    let mut current_dxf: Option<Style> = None;
    let mut in_font = false;
    let mut fill: Option<FillState> = None;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"dxfs" => in_dxfs = true,
                b"dxf" if in_dxfs => current_dxf = Some(Style::default()),
                b"font" if current_dxf.is_some() => in_font = true,
                b"fill" if current_dxf.is_some() => fill = Some(FillState::default()),
                b"patternFill" => {
                    if let Some(state) = fill.as_mut() {
                        state.pattern = pattern_type(&e);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"dxfs" => {}
                b"dxf" if in_dxfs => parsed.dxf_styles.push(Style::default()),
                b"b" if in_font => {
                    if let Some(dxf) = current_dxf.as_mut() {
                        dxf.font.bold = bool_val(&e);
                    }
                }
                b"color" if in_font => {
                    if let Some(dxf) = current_dxf.as_mut() {
                        dxf.font.color = parse_color_attrs(&e);
                    }
                }
                b"patternFill" => {
                    if let Some(state) = fill.as_mut() {
                        state.pattern = pattern_type(&e);
                    }
                }
                b"fgColor" => {
                    if let Some(state) = fill.as_mut() {
                        state.fg = Some(parse_color_attrs(&e));
                    }
                }
                b"bgColor" => {
                    if let Some(state) = fill.as_mut() {
                        state.bg = Some(parse_color_attrs(&e));
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"dxfs" => in_dxfs = false,
                b"dxf" => {
                    if let Some(dxf) = current_dxf.take() {
                        parsed.dxf_styles.push(dxf);
                    }
                }
                b"font" => in_font = false,
                b"fill" => {
                    if let (Some(state), Some(dxf)) = (fill.take(), current_dxf.as_mut()) {
                        dxf.fill = state.finish();
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parsed)
}

fn pattern_type(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"patternType")
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

/// `<b/>` means true; `<b val="0"/>` means false
fn bool_val(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"val")
        .and_then(|attr| attr.unescape_value().ok().map(|s| s != "0" && s != "false"))
        .unwrap_or(true)
}

/// Parse `rgb`/`auto` color attributes
///
/// Fully opaque ARGB values come back as [`Color::Rgb`], the form the writer
/// started from. Theme and indexed colors are not used by mosaic workbooks
/// and read as [`Color::Auto`].
fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    let rgb = e
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"rgb")
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()));

    match rgb.as_deref().and_then(Color::from_hex) {
        Some(Color::Argb { a: 0xFF, r, g, b }) => Color::rgb(r, g, b),
        Some(color) => color,
        None => Color::Auto,
    }
}
