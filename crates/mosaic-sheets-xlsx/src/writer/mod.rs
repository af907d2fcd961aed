//! XLSX writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;
use mosaic_sheets_core::conditional_format::CfRuleType;
use mosaic_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "A workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);

        let style_table = XlsxStyleTable::build(workbook);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_styles_xml(&mut zip, &style_table)?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            Self::write_worksheet(&mut zip, sheet, i, &style_table)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        // Formulas are stored with a cached value only; ask for a recalc on open
        content.push_str(
            r#"
    </sheets>
    <calcPr calcId="0" fullCalcOnLoad="1"/>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        let styles_rid = workbook.sheet_count() + 1;
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            styles_rid
        ));

        content.push_str("\n</Relationships>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        let xml = style_table.to_styles_xml();
        zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if let Some(used) = sheet.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", used));
        }
        content.push_str("\n    <sheetData>");

        // Sparse, row-major
        let mut current_row: Option<u32> = None;
        for (row, col, value) in sheet.iter_cells() {
            if current_row != Some(row) {
                if current_row.is_some() {
                    content.push_str("\n        </row>");
                }
                content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
                current_row = Some(row);
            }

            let cell_ref = CellAddress::new(row, col).to_a1_string();
            Self::write_cell(&mut content, &cell_ref, value);
        }

        if current_row.is_some() {
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>");

        Self::write_conditional_formatting(&mut content, sheet, index, style_table);

        content.push_str("\n</worksheet>");

        log::debug!(
            "sheet{}.xml '{}': {} cells, {} conditional formats",
            index + 1,
            sheet.name(),
            sheet.cell_count(),
            sheet.conditional_format_count()
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_cell(content: &mut String, cell_ref: &str, value: &CellValue) {
        match value {
            CellValue::Number(n) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\"><v>{}</v></c>",
                    cell_ref, n
                ));
            }
            CellValue::String(s) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    cell_ref,
                    escape_xml(s)
                ));
            }
            CellValue::Formula { text, cached_value } => {
                let formula_text = text.strip_prefix('=').unwrap_or(text);
                let cached = cached_value.map_or(String::new(), |v| format!("<v>{}</v>", v));
                content.push_str(&format!(
                    "\n            <c r=\"{}\"><f>{}</f>{}</c>",
                    cell_ref,
                    escape_xml(formula_text),
                    cached
                ));
            }
            CellValue::Error(e) => {
                content.push_str(&format!(
                    "\n            <c r=\"{}\" t=\"e\"><v>{}</v></c>",
                    cell_ref,
                    escape_xml(e.as_str())
                ));
            }
            CellValue::Empty => {}
        }
    }

    fn write_conditional_formatting(
        content: &mut String,
        sheet: &Worksheet,
        sheet_index: usize,
        style_table: &XlsxStyleTable,
    ) {
        // One <conditionalFormatting> per rule
        for (rule_idx, rule) in sheet.conditional_formats().iter().enumerate() {
            if rule.ranges.is_empty() {
                log::warn!(
                    "skipping conditional format {} on '{}': no ranges",
                    rule_idx,
                    sheet.name()
                );
                continue;
            }

            let sqref = rule
                .ranges
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(" ");

            content.push_str(&format!(
                "\n    <conditionalFormatting sqref=\"{}\">",
                sqref
            ));

            let rule_type = rule.rule_type.xlsx_type();
            // Rules read back from a file keep their original dxf_id
            let dxf_id = style_table
                .dxf_id_for(sheet_index, rule_idx)
                .or(rule.dxf_id);
            let dxf_attr = dxf_id.map_or(String::new(), |id| format!(" dxfId=\"{}\"", id));
            let priority_val = rule.priority.max(1);
            let stop_if_true = if rule.stop_if_true {
                " stopIfTrue=\"1\""
            } else {
                ""
            };

            match &rule.rule_type {
                CfRuleType::CellIs {
                    operator,
                    formula1,
                    formula2,
                } => {
                    content.push_str(&format!(
                        "\n        <cfRule type=\"{}\" operator=\"{}\" priority=\"{}\"{}{}>\n            <formula>{}</formula>",
                        rule_type,
                        operator.xlsx_operator(),
                        priority_val,
                        dxf_attr,
                        stop_if_true,
                        escape_xml(formula1)
                    ));
                    if let Some(f2) = formula2 {
                        content.push_str(&format!(
                            "\n            <formula>{}</formula>",
                            escape_xml(f2)
                        ));
                    }
                    content.push_str("\n        </cfRule>");
                }

                CfRuleType::Expression { formula } => {
                    content.push_str(&format!(
                        "\n        <cfRule type=\"{}\" priority=\"{}\"{}{}>\n            <formula>{}</formula>\n        </cfRule>",
                        rule_type,
                        priority_val,
                        dxf_attr,
                        stop_if_true,
                        escape_xml(formula.strip_prefix('=').unwrap_or(formula))
                    ));
                }
            }

            content.push_str("\n    </conditionalFormatting>");
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    use mosaic_sheets_core::style::{Color, Style};
    use mosaic_sheets_core::{CellRange, ConditionalFormatRule};

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    fn write(workbook: &Workbook) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        XlsxWriter::write(workbook, &mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_formula_cell_written_with_cached_value() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("B2", CellValue::formula_with_cached("=CHOOSE($CN$53,8,16)", 8.0))
            .unwrap();
        ws.set_cell_value("CN53", 1.0).unwrap();

        let xml = part(&write(&wb), "xl/worksheets/sheet1.xml");
        assert!(xml.contains("<c r=\"B2\"><f>CHOOSE($CN$53,8,16)</f><v>8</v></c>"));
        assert!(xml.contains("<c r=\"CN53\"><v>1</v></c>"));
        assert!(xml.contains("<dimension ref=\"B2:CN53\"/>"));
    }

    #[test]
    fn test_cell_is_rule_references_dxf() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.add_conditional_format(
            ConditionalFormatRule::cell_is_equal_to("128")
                .with_range(CellRange::parse("B2:C3").unwrap())
                .with_format(Style::camouflage(Color::gray(128)))
                .with_priority(17),
        );

        let xml = part(&write(&wb), "xl/worksheets/sheet1.xml");
        assert!(xml.contains("<conditionalFormatting sqref=\"B2:C3\">"));
        assert!(xml.contains(
            "<cfRule type=\"cellIs\" operator=\"equal\" priority=\"17\" dxfId=\"0\">"
        ));
        assert!(xml.contains("<formula>128</formula>"));
    }

    #[test]
    fn test_sheet_names_are_escaped() {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("R&D").unwrap();

        let xml = part(&write(&wb), "xl/workbook.xml");
        assert!(xml.contains("name=\"R&amp;D\""));
    }

    #[test]
    fn test_empty_workbook_rejected() {
        let mut buf = Cursor::new(Vec::new());
        assert!(matches!(
            XlsxWriter::write(&Workbook::empty(), &mut buf),
            Err(XlsxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
