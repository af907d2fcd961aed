//! XLSX reader
//!
//! Reads back what the writer produces (and what spreadsheet applications
//! save after editing a mosaic workbook): cell values, formulas with their
//! cached results, and `cellIs`/`expression` conditional formatting with the
//! dxf styles the rules reference.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, ParsedStyles};
use mosaic_sheets_core::conditional_format::{CfOperator, CfRuleType, ConditionalFormatRule};
use mosaic_sheets_core::style::Style;
use mosaic_sheets_core::{CellAddress, CellError, CellRange, CellValue, Workbook, Worksheet};

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let dxf_styles = Self::read_styles(&mut archive)?.dxf_styles;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship {}", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(
                &mut archive,
                path,
                &mut worksheet,
                &shared_strings,
                &dxf_styles,
            )?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("Workbook has no worksheets".into()));
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(std::mem::take(&mut current_string));
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<ParsedStyles> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(ParsedStyles::default()),
        }
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attr_value(&e, b"name");
                    let r_id = attr_value(&e, b"r:id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        dxf_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        // Cell state
        let mut cell: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        // Conditional formatting state
        let mut cf_sqref: Option<String> = None;
        let mut cf_rule: Option<RawCfRule> = None;
        let mut in_cf_formula = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => cell = Some(RawCell::from_attrs(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"f" if cell.is_some() => in_formula = true,
                    b"t" if cell.is_some() => in_inline_text = true,
                    b"conditionalFormatting" => cf_sqref = attr_value(&e, b"sqref"),
                    b"cfRule" => cf_rule = Some(RawCfRule::from_attrs(&e)),
                    b"formula" if cf_rule.is_some() => in_cf_formula = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // <c r="A1"/> holds no value
                    b"c" => {}
                    b"cfRule" => {
                        let raw = RawCfRule::from_attrs(&e);
                        Self::finish_cf_rule(worksheet, raw, cf_sqref.as_deref(), dxf_styles);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(raw) = cell.take() {
                            Self::process_cell(worksheet, raw, shared_strings)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"formula" => in_cf_formula = false,
                    b"cfRule" => {
                        if let Some(raw) = cf_rule.take() {
                            Self::finish_cf_rule(worksheet, raw, cf_sqref.as_deref(), dxf_styles);
                        }
                    }
                    b"conditionalFormatting" => cf_sqref = None,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    let text = e.unescape().map_err(XlsxError::Xml)?;
                    if let Some(raw) = cell.as_mut() {
                        if in_value {
                            raw.value = Some(text.to_string());
                        } else if in_formula {
                            raw.formula = Some(text.to_string());
                        } else if in_inline_text {
                            raw.value.get_or_insert_with(String::new).push_str(&text);
                        }
                    } else if in_cf_formula {
                        if let Some(raw) = cf_rule.as_mut() {
                            raw.formulas.push(text.to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn process_cell(
        worksheet: &mut Worksheet,
        raw: RawCell,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let cell_ref = raw
            .reference
            .ok_or_else(|| XlsxError::Parse("Cell without a reference".into()))?;
        let addr = CellAddress::parse(&cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        let cell_value = if let Some(f) = raw.formula {
            // Only numeric results are cached
            let cached = match raw.cell_type.as_deref() {
                None | Some("n") => raw.value.as_deref().and_then(|v| v.parse::<f64>().ok()),
                _ => None,
            };
            let text = if f.starts_with('=') { f } else { format!("={}", f) };
            CellValue::Formula {
                text,
                cached_value: cached,
            }
        } else if let Some(value) = raw.value {
            match raw.cell_type.as_deref() {
                Some("s") => {
                    let idx: usize = value.parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::String(s.clone())
                }
                Some("e") => CellError::parse(&value)
                    .map(CellValue::Error)
                    .unwrap_or(CellValue::String(value)),
                Some("inlineStr") | Some("str") => CellValue::String(value),
                Some("b") => CellValue::Number(if value == "1" { 1.0 } else { 0.0 }),
                None | Some("n") => match value.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::String(value),
                },
                Some(_) => CellValue::String(value),
            }
        } else {
            return Ok(());
        };

        worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?;
        Ok(())
    }

    fn finish_cf_rule(
        worksheet: &mut Worksheet,
        raw: RawCfRule,
        sqref: Option<&str>,
        dxf_styles: &[Style],
    ) {
        let rule_type = match raw.rule_type.as_deref() {
            Some("cellIs") => {
                let operator = raw
                    .operator
                    .as_deref()
                    .and_then(CfOperator::from_xlsx)
                    .unwrap_or(CfOperator::Equal);
                let mut formulas = raw.formulas.into_iter();
                CfRuleType::CellIs {
                    operator,
                    formula1: formulas.next().unwrap_or_default(),
                    formula2: formulas.next(),
                }
            }
            Some("expression") => CfRuleType::Expression {
                formula: raw.formulas.into_iter().next().unwrap_or_default(),
            },
            other => {
                log::warn!(
                    "skipping unsupported conditional format type {:?} on '{}'",
                    other,
                    worksheet.name()
                );
                return;
            }
        };

        let mut rule = ConditionalFormatRule::new(rule_type)
            .with_priority(raw.priority)
            .with_stop_if_true(raw.stop_if_true);
        rule.ranges = sqref.map(parse_sqref).unwrap_or_default();
        rule.dxf_id = raw.dxf_id;
        rule.format = raw
            .dxf_id
            .and_then(|id| dxf_styles.get(id as usize))
            .copied();

        worksheet.add_conditional_format(rule);
    }
}

/// A `<c>` element as it is being read
#[derive(Debug, Default)]
struct RawCell {
    reference: Option<String>,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
}

impl RawCell {
    fn from_attrs(e: &BytesStart<'_>) -> Self {
        Self {
            reference: attr_value(e, b"r"),
            cell_type: attr_value(e, b"t"),
            ..Default::default()
        }
    }
}

/// A `<cfRule>` element as it is being read
#[derive(Debug)]
struct RawCfRule {
    rule_type: Option<String>,
    operator: Option<String>,
    priority: u32,
    stop_if_true: bool,
    dxf_id: Option<u32>,
    formulas: Vec<String>,
}

impl RawCfRule {
    fn from_attrs(e: &BytesStart<'_>) -> Self {
        Self {
            rule_type: attr_value(e, b"type"),
            operator: attr_value(e, b"operator"),
            priority: attr_value(e, b"priority")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            stop_if_true: attr_value(e, b"stopIfTrue").map_or(false, |s| s == "1"),
            dxf_id: attr_value(e, b"dxfId").and_then(|s| s.parse().ok()),
            formulas: Vec::new(),
        }
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

/// Parse a space-separated sqref string into cell ranges
fn parse_sqref(sqref: &str) -> Vec<CellRange> {
    sqref
        .split_whitespace()
        .filter_map(|s| match CellRange::parse(s) {
            Ok(range) => Some(range),
            Err(e) => {
                log::warn!("ignoring sqref entry '{}': {}", s, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    fn minimal_xlsx(sheet_xml: &str, extra: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();

            for (name, content) in extra {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_sheet() {
        let bytes = minimal_xlsx("<worksheet><sheetData></sheetData></worksheet>", &[]);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Sheet1");
        assert!(workbook.worksheet(0).unwrap().is_empty());
    }

    #[test]
    fn test_read_cell_kinds() {
        let sheet = r#"<worksheet><sheetData><row r="1">
            <c r="A1"><v>42</v></c>
            <c r="B1" t="s"><v>0</v></c>
            <c r="C1" t="inlineStr"><is><t>inline &amp; text</t></is></c>
            <c r="D1" t="e"><v>#VALUE!</v></c>
            <c r="E1"><f>CHOOSE($A$1,1,2)</f><v>2</v></c>
            <c r="F1"><f>A1*2</f></c>
            <c r="G1"/>
        </row></sheetData></worksheet>"#;
        let shared = r#"<sst><si><t>shared</t></si></sst>"#;
        let bytes = minimal_xlsx(sheet, &[("xl/sharedStrings.xml", shared)]);

        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap(), CellValue::Number(42.0));
        assert_eq!(ws.get_value("B1").unwrap(), CellValue::string("shared"));
        assert_eq!(ws.get_value("C1").unwrap(), CellValue::string("inline & text"));
        assert_eq!(ws.get_value("D1").unwrap(), CellValue::Error(CellError::Value));
        assert_eq!(
            ws.get_value("E1").unwrap(),
            CellValue::formula_with_cached("=CHOOSE($A$1,1,2)", 2.0)
        );
        assert_eq!(ws.get_value("F1").unwrap(), CellValue::formula("=A1*2"));
        assert_eq!(ws.cell_count(), 6);
    }

    #[test]
    fn test_read_conditional_formats() {
        let sheet = r#"<worksheet><sheetData/>
            <conditionalFormatting sqref="B2:C3 E5">
                <cfRule type="cellIs" operator="equal" priority="3" dxfId="0"><formula>8</formula></cfRule>
            </conditionalFormatting>
            <conditionalFormatting sqref="A1">
                <cfRule type="expression" priority="4" stopIfTrue="1"><formula>A1&gt;0</formula></cfRule>
            </conditionalFormatting>
            <conditionalFormatting sqref="A1">
                <cfRule type="duplicateValues" priority="5" dxfId="0"/>
            </conditionalFormatting>
        </worksheet>"#;
        let styles = r#"<styleSheet><dxfs count="1"><dxf><fill><patternFill patternType="solid"><bgColor rgb="FF080808"/></patternFill></fill></dxf></dxfs></styleSheet>"#;
        let bytes = minimal_xlsx(sheet, &[("xl/styles.xml", styles)]);

        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let rules = workbook.worksheet(0).unwrap().conditional_formats();

        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[0].ranges,
            vec![
                CellRange::parse("B2:C3").unwrap(),
                CellRange::parse("E5").unwrap()
            ]
        );
        assert_eq!(rules[0].priority, 3);
        assert_eq!(rules[0].dxf_id, Some(0));
        assert_eq!(
            rules[0].format,
            Some(Style::new().fill_color(mosaic_sheets_core::Color::gray(8)))
        );
        assert_eq!(rules[0].matches_value(8.0), Some(true));

        assert_eq!(
            rules[1].rule_type,
            CfRuleType::Expression {
                formula: "A1>0".into()
            }
        );
        assert!(rules[1].stop_if_true);
        assert_eq!(rules[1].format, None);
    }

    #[test]
    fn test_missing_content_types_is_invalid() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"not a workbook").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            XlsxReader::read(Cursor::new(b"plain text".to_vec())),
            Err(XlsxError::Zip(_))
        ));
    }
}
