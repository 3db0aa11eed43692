//! Workbook assembly and saving.

use crate::error::{Error, Result};
use crate::xlsx::escape_xml;
use crate::xlsx::package::{
    PackageWriter, Relationships, app_properties_xml, content_type as ct, core_properties_xml,
    relationship_type as rt,
};
use crate::xlsx::sheet::Worksheet;
use crate::xlsx::strings::SharedStrings;
use crate::xlsx::styles::StylesBuilder;
use chrono::{DateTime, Utc};
use std::fmt::Write as FmtWrite;
use std::path::Path;
use tracing::debug;

/// Characters Excel rejects in sheet names.
const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_LEN: usize = 31;

/// Document metadata written to `docProps/core.xml`.
#[derive(Debug, Clone)]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub created: DateTime<Utc>,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        Self {
            title: None,
            created: Utc::now(),
        }
    }
}

/// A workbook under construction.
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    properties: DocumentProperties,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a worksheet and return it for filling. The first worksheet is
    /// the one selected when the file opens.
    pub fn add_worksheet(&mut self, name: &str) -> &mut Worksheet {
        self.worksheets.push(Worksheet::new(name));
        let index = self.worksheets.len() - 1;
        &mut self.worksheets[index]
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    /// Look up a worksheet by name.
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    pub fn properties_mut(&mut self) -> &mut DocumentProperties {
        &mut self.properties
    }

    fn validate_sheet_names(&self) -> Result<()> {
        if self.worksheets.is_empty() {
            return Err(Error::Config("workbook has no worksheets".to_string()));
        }
        for (i, ws) in self.worksheets.iter().enumerate() {
            let name = ws.name();
            if name.is_empty()
                || name.chars().count() > MAX_SHEET_NAME_LEN
                || name.contains(INVALID_SHEET_NAME_CHARS)
            {
                return Err(Error::Config(format!("invalid worksheet name '{}'", name)));
            }
            if self.worksheets[..i]
                .iter()
                .any(|other| other.name().eq_ignore_ascii_case(name))
            {
                return Err(Error::Config(format!("duplicate worksheet name '{}'", name)));
            }
        }
        Ok(())
    }

    /// `xl/workbook.xml`. Full recalculation on load makes Excel refresh
    /// every cached formula result.
    fn workbook_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
        xml.push_str(r#"<bookViews><workbookView activeTab="0"/></bookViews>"#);
        xml.push_str("<sheets>");
        for (i, ws) in self.worksheets.iter().enumerate() {
            write!(
                xml,
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(ws.name()),
                i + 1,
                i + 1
            )?;
        }
        xml.push_str("</sheets>");
        xml.push_str(r#"<calcPr calcId="191029" fullCalcOnLoad="1"/>"#);
        xml.push_str("</workbook>");
        Ok(xml)
    }

    /// Serialize the workbook to XLSX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.validate_sheet_names()?;

        let mut package = PackageWriter::new();
        let mut shared_strings = SharedStrings::new();
        let mut styles = StylesBuilder::new();

        let mut package_rels = Relationships::new();
        package_rels.add(rt::OFFICE_DOCUMENT, "xl/workbook.xml");
        package_rels.add(rt::CORE_PROPERTIES, "docProps/core.xml");
        package_rels.add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");
        package.add_part("_rels/.rels", None, package_rels.to_xml()?);

        package.add_part(
            "docProps/core.xml",
            Some(ct::OPC_CORE_PROPERTIES),
            core_properties_xml(self.properties.title.as_deref(), self.properties.created)?,
        );
        let names: Vec<&str> = self.worksheets.iter().map(|ws| ws.name()).collect();
        package.add_part(
            "docProps/app.xml",
            Some(ct::OFC_EXTENDED_PROPERTIES),
            app_properties_xml(&names)?,
        );

        package.add_part("xl/workbook.xml", Some(ct::SML_SHEET_MAIN), self.workbook_xml()?);

        // Worksheet rIds must match the r:id values in workbook.xml.
        let mut workbook_rels = Relationships::new();
        for (i, ws) in self.worksheets.iter().enumerate() {
            let target = format!("worksheets/sheet{}.xml", i + 1);
            workbook_rels.add(rt::WORKSHEET, &target);
            let sheet_xml = ws.to_xml(&mut shared_strings, &mut styles, i == 0)?;
            debug!(sheet = ws.name(), bytes = sheet_xml.len(), "serialized worksheet");
            package.add_part(&format!("xl/{}", target), Some(ct::SML_WORKSHEET), sheet_xml);
        }
        workbook_rels.add(rt::STYLES, "styles.xml");
        workbook_rels.add(rt::SHARED_STRINGS, "sharedStrings.xml");
        package.add_part("xl/_rels/workbook.xml.rels", None, workbook_rels.to_xml()?);

        // Styles and strings are complete only after every sheet is written.
        package.add_part("xl/styles.xml", Some(ct::SML_STYLES), styles.to_xml()?);
        package.add_part(
            "xl/sharedStrings.xml",
            Some(ct::SML_SHARED_STRINGS),
            shared_strings.to_xml()?,
        );

        package.finish()
    }

    /// Write the workbook to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
