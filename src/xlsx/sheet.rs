//! Worksheet model and `xl/worksheets/sheetN.xml` serialization.

use crate::error::Result;
use crate::xlsx::format::{CellFormat, ConditionalFormat, DataValidation};
use crate::xlsx::strings::SharedStrings;
use crate::xlsx::styles::StylesBuilder;
use crate::xlsx::{cell_ref, escape_xml, range_ref};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;

/// Value stored in a worksheet cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Text, stored in the shared strings table
    String(String),
    /// Formula without the leading `=`, optionally with a cached text result
    Formula {
        formula: String,
        cached_value: Option<String>,
    },
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

/// A worksheet under construction.
///
/// Row and column arguments are 1-based; storage is 0-based.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    cell_formats: HashMap<(u32, u32), CellFormat>,
    column_widths: BTreeMap<u32, f64>,
    hidden_columns: BTreeSet<u32>,
    show_grid_lines: bool,
    validations: Vec<DataValidation>,
    conditional_formats: Vec<ConditionalFormat>,
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            cell_formats: HashMap::new(),
            column_widths: BTreeMap::new(),
            hidden_columns: BTreeSet::new(),
            show_grid_lines: true,
            validations: Vec::new(),
            conditional_formats: Vec::new(),
        }
    }

    /// Get the worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell value.
    ///
    /// # Arguments
    /// * `row` - 1-based row number (1 = first row)
    /// * `col` - 1-based column number (1 = column A)
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) {
        self.cells.insert(Self::key(row, col), value.into());
    }

    /// Set a cell formula (without the leading `=`).
    pub fn set_cell_formula(&mut self, row: u32, col: u32, formula: &str) {
        self.cells.insert(
            Self::key(row, col),
            CellValue::Formula {
                formula: formula.to_string(),
                cached_value: None,
            },
        );
    }

    /// Set a cell formula with a cached text result.
    ///
    /// Readers that do not recalculate show the cached text.
    pub fn set_cell_formula_with_cache(&mut self, row: u32, col: u32, formula: &str, cached: &str) {
        self.cells.insert(
            Self::key(row, col),
            CellValue::Formula {
                formula: formula.to_string(),
                cached_value: Some(cached.to_string()),
            },
        );
    }

    /// Set cell formatting.
    pub fn set_cell_format(&mut self, row: u32, col: u32, format: CellFormat) {
        self.cell_formats.insert(Self::key(row, col), format);
    }

    /// Set a column width in characters.
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col.saturating_sub(1), width);
    }

    pub fn hide_column(&mut self, col: u32) {
        self.hidden_columns.insert(col.saturating_sub(1));
    }

    pub fn set_show_grid_lines(&mut self, show: bool) {
        self.show_grid_lines = show;
    }

    pub fn add_data_validation(&mut self, validation: DataValidation) {
        self.validations.push(validation);
    }

    pub fn add_conditional_format(&mut self, format: ConditionalFormat) {
        self.conditional_formats.push(format);
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&Self::key(row, col))
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col.saturating_sub(1)).copied()
    }

    pub fn is_column_hidden(&self, col: u32) -> bool {
        self.hidden_columns.contains(&col.saturating_sub(1))
    }

    pub fn show_grid_lines(&self) -> bool {
        self.show_grid_lines
    }

    pub fn data_validations(&self) -> &[DataValidation] {
        &self.validations
    }

    pub fn conditional_formats(&self) -> &[ConditionalFormat] {
        &self.conditional_formats
    }

    /// Bounding box of cells with a value or format, 0-based and inclusive.
    pub fn used_range(&self) -> Option<(u32, u32, u32, u32)> {
        let keys = self.cells.keys().chain(self.cell_formats.keys());
        keys.fold(None, |acc, &(r, c)| match acc {
            None => Some((r, c, r, c)),
            Some((r0, c0, r1, c1)) => Some((r0.min(r), c0.min(c), r1.max(r), c1.max(c))),
        })
    }

    fn key(row: u32, col: u32) -> (u32, u32) {
        (row.saturating_sub(1), col.saturating_sub(1))
    }

    /// Serialize the worksheet.
    ///
    /// Strings go to `shared_strings`; cell formats and conditional format
    /// styles are registered with `styles`.
    pub fn to_xml(
        &self,
        shared_strings: &mut SharedStrings,
        styles: &mut StylesBuilder,
        tab_selected: bool,
    ) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        match self.used_range() {
            Some((min_row, min_col, max_row, max_col)) => write!(
                xml,
                r#"<dimension ref="{}"/>"#,
                range_ref(min_row + 1, min_col + 1, max_row + 1, max_col + 1)
            )?,
            None => xml.push_str(r#"<dimension ref="A1"/>"#),
        }

        xml.push_str(r#"<sheetViews><sheetView workbookViewId="0""#);
        if !self.show_grid_lines {
            xml.push_str(r#" showGridLines="0""#);
        }
        if tab_selected {
            xml.push_str(r#" tabSelected="1""#);
        }
        xml.push_str("/></sheetViews>");
        xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);

        self.write_cols(&mut xml)?;

        xml.push_str("<sheetData>");
        self.write_sheet_data(&mut xml, shared_strings, styles)?;
        xml.push_str("</sheetData>");

        self.write_conditional_formats(&mut xml, styles)?;
        self.write_data_validations(&mut xml)?;

        xml.push_str(
            r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
        );
        xml.push_str("</worksheet>");

        Ok(xml)
    }

    /// Write column information (widths and hidden state).
    fn write_cols(&self, xml: &mut String) -> Result<()> {
        let cols: BTreeSet<u32> = self
            .column_widths
            .keys()
            .chain(&self.hidden_columns)
            .copied()
            .collect();
        if cols.is_empty() {
            return Ok(());
        }

        xml.push_str("<cols>");
        for col in cols {
            write!(xml, r#"<col min="{}" max="{}""#, col + 1, col + 1)?;
            match self.column_widths.get(&col) {
                Some(width) => write!(xml, r#" width="{}" customWidth="1""#, width)?,
                None => xml.push_str(r#" width="8.43""#),
            }
            if self.hidden_columns.contains(&col) {
                xml.push_str(r#" hidden="1""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</cols>");
        Ok(())
    }

    fn write_sheet_data(
        &self,
        xml: &mut String,
        shared_strings: &mut SharedStrings,
        styles: &mut StylesBuilder,
    ) -> Result<()> {
        let occupied: BTreeSet<(u32, u32)> = self
            .cells
            .keys()
            .chain(self.cell_formats.keys())
            .copied()
            .collect();

        let mut current_row = None;
        for (row, col) in occupied {
            if current_row != Some(row) {
                if current_row.is_some() {
                    xml.push_str("</row>");
                }
                write!(xml, r#"<row r="{}">"#, row + 1)?;
                current_row = Some(row);
            }

            let style_index = self
                .cell_formats
                .get(&(row, col))
                .map(|format| styles.add_cell_format(format))
                .filter(|&index| index != 0);
            self.write_cell(
                xml,
                &cell_ref(row + 1, col + 1),
                self.cells.get(&(row, col)),
                shared_strings,
                style_index,
            )?;
        }
        if current_row.is_some() {
            xml.push_str("</row>");
        }

        Ok(())
    }

    fn write_cell(
        &self,
        xml: &mut String,
        cell_ref: &str,
        value: Option<&CellValue>,
        shared_strings: &mut SharedStrings,
        style_index: Option<usize>,
    ) -> Result<()> {
        let style_attr = match style_index {
            Some(idx) => format!(r#" s="{}""#, idx),
            None => String::new(),
        };

        match value {
            None => write!(xml, r#"<c r="{}"{}/>"#, cell_ref, style_attr)?,
            Some(CellValue::String(s)) => {
                let string_index = shared_strings.add_string(s);
                write!(
                    xml,
                    r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                    cell_ref, style_attr, string_index
                )?;
            },
            Some(CellValue::Formula {
                formula,
                cached_value,
            }) => match cached_value {
                Some(cached) => write!(
                    xml,
                    r#"<c r="{}"{} t="str"><f>{}</f><v>{}</v></c>"#,
                    cell_ref,
                    style_attr,
                    escape_xml(formula),
                    escape_xml(cached)
                )?,
                None => write!(
                    xml,
                    r#"<c r="{}"{}><f>{}</f></c>"#,
                    cell_ref,
                    style_attr,
                    escape_xml(formula)
                )?,
            },
        }

        Ok(())
    }

    /// Write conditional formatting blocks, one per range in insertion order.
    fn write_conditional_formats(
        &self,
        xml: &mut String,
        styles: &mut StylesBuilder,
    ) -> Result<()> {
        let mut ranges: Vec<(&str, Vec<&ConditionalFormat>)> = Vec::new();
        for format in &self.conditional_formats {
            match ranges.iter().position(|(range, _)| *range == format.range) {
                Some(i) => ranges[i].1.push(format),
                None => ranges.push((format.range.as_str(), vec![format])),
            }
        }

        for (range, formats) in ranges {
            write!(
                xml,
                r#"<conditionalFormatting sqref="{}">"#,
                escape_xml(range)
            )?;
            for format in formats {
                let dxf_id = styles.add_dxf(&format.format);
                let text = escape_xml(&format.text);
                write!(
                    xml,
                    r#"<cfRule type="containsText" dxfId="{}" priority="{}" operator="containsText" text="{}"><formula>{}</formula></cfRule>"#,
                    dxf_id,
                    format.priority,
                    text,
                    escape_xml(&contains_text_formula(&format.text, range))
                )?;
            }
            xml.push_str("</conditionalFormatting>");
        }

        Ok(())
    }

    fn write_data_validations(&self, xml: &mut String) -> Result<()> {
        if self.validations.is_empty() {
            return Ok(());
        }

        write!(
            xml,
            r#"<dataValidations count="{}">"#,
            self.validations.len()
        )?;
        for validation in &self.validations {
            xml.push_str(r#"<dataValidation type="list""#);
            if validation.allow_blank {
                xml.push_str(r#" allowBlank="1""#);
            }
            if validation.show_error_alert {
                xml.push_str(r#" showErrorMessage="1""#);
            }
            if let Some(ref title) = validation.error_title {
                write!(xml, r#" errorTitle="{}""#, escape_xml(title))?;
            }
            if let Some(ref msg) = validation.error_message {
                write!(xml, r#" error="{}""#, escape_xml(msg))?;
            }
            write!(xml, r#" sqref="{}">"#, escape_xml(&validation.range))?;

            let list = validation.values.join(",").replace('"', "\"\"");
            write!(
                xml,
                "<formula1>{}</formula1>",
                escape_xml(&format!("\"{}\"", list))
            )?;
            xml.push_str("</dataValidation>");
        }
        xml.push_str("</dataValidations>");

        Ok(())
    }
}

/// `containsText` rule formula, anchored at the range's top-left cell.
fn contains_text_formula(text: &str, range: &str) -> String {
    let top_left = range.split(':').next().unwrap_or(range);
    format!(
        "NOT(ISERROR(SEARCH(\"{}\",{})))",
        text.replace('"', "\"\""),
        top_left
    )
}
