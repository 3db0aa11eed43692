//! OPC packaging: content types, relationships, document properties and
//! the ZIP container.

use crate::error::Result;
use crate::xlsx::escape_xml;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Content type URIs used by SpreadsheetML packages.
pub mod content_type {
    pub const SML_SHEET_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const SML_WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const SML_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const SML_SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";
    pub const OPC_CORE_PROPERTIES: &str =
        "application/vnd.openxmlformats-package.core-properties+xml";
    pub const OFC_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
}

/// Relationship type URIs.
pub mod relationship_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
}

use content_type as ct;

/// Builder for `[Content_Types].xml`.
#[derive(Debug)]
pub(crate) struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub(crate) fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    /// Register an override for an absolute part name such as `/xl/workbook.xml`.
    pub(crate) fn add_override(&mut self, partname: &str, content_type: &str) {
        self.overrides
            .insert(partname.to_string(), content_type.to_string());
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, content_type) in &self.defaults {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            )?;
        }
        for (partname, content_type) in &self.overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            )?;
        }
        xml.push_str("</Types>");

        Ok(xml)
    }
}

/// A relationships part (`.rels`).
#[derive(Debug, Default)]
pub(crate) struct Relationships {
    rels: Vec<(String, &'static str, String)>,
}

impl Relationships {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a relationship and return its `rId`.
    pub(crate) fn add(&mut self, reltype: &'static str, target: &str) -> String {
        let r_id = format!("rId{}", self.rels.len() + 1);
        self.rels.push((r_id.clone(), reltype, target.to_string()));
        r_id
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (r_id, reltype, target) in &self.rels {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                r_id,
                reltype,
                escape_xml(target)
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

/// `docProps/core.xml` content.
pub(crate) fn core_properties_xml(
    title: Option<&str>,
    created: DateTime<Utc>,
) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);

    if let Some(title) = title {
        write!(xml, "<dc:title>{}</dc:title>", escape_xml(title))?;
    }
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    write!(
        xml,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
        stamp
    )?;
    write!(
        xml,
        r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
        stamp
    )?;

    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// `docProps/app.xml` content listing the worksheet titles.
pub(crate) fn app_properties_xml(sheet_names: &[&str]) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
    write!(
        xml,
        "<Application>{}</Application>",
        escape_xml(env!("CARGO_PKG_NAME"))
    )?;
    write!(
        xml,
        r#"<HeadingPairs><vt:vector size="2" baseType="variant"><vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant><vt:variant><vt:i4>{}</vt:i4></vt:variant></vt:vector></HeadingPairs>"#,
        sheet_names.len()
    )?;
    write!(
        xml,
        r#"<TitlesOfParts><vt:vector size="{}" baseType="lpstr">"#,
        sheet_names.len()
    )?;
    for name in sheet_names {
        write!(xml, "<vt:lpstr>{}</vt:lpstr>", escape_xml(name))?;
    }
    xml.push_str("</vt:vector></TitlesOfParts></Properties>");
    Ok(xml)
}

/// ZIP container writer for package parts.
pub(crate) struct PackageWriter {
    zip_writer: ZipWriter<Cursor<Vec<u8>>>,
    content_types: ContentTypes,
    parts: Vec<(String, Vec<u8>)>,
}

impl PackageWriter {
    pub(crate) fn new() -> Self {
        Self {
            zip_writer: ZipWriter::new(Cursor::new(Vec::new())),
            content_types: ContentTypes::new(),
            parts: Vec::new(),
        }
    }

    /// Queue a part. `partname` is relative to the package root
    /// (e.g. `xl/workbook.xml`); `content_type` of `None` relies on the
    /// extension defaults.
    pub(crate) fn add_part(&mut self, partname: &str, content_type: Option<&str>, blob: String) {
        if let Some(content_type) = content_type {
            self.content_types
                .add_override(&format!("/{}", partname), content_type);
        }
        self.parts.push((partname.to_string(), blob.into_bytes()));
    }

    /// Write `[Content_Types].xml` followed by every queued part and return
    /// the archive bytes.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let content_types = self.content_types.to_xml()?;
        self.zip_writer.start_file("[Content_Types].xml", options)?;
        self.zip_writer.write_all(content_types.as_bytes())?;

        for (partname, blob) in &self.parts {
            self.zip_writer.start_file(partname.as_str(), options)?;
            self.zip_writer.write_all(blob)?;
        }

        let cursor = self.zip_writer.finish()?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypes::new();
        cti.add_override("/xl/workbook.xml", ct::SML_SHEET_MAIN);

        let xml = cti.to_xml().unwrap();
        assert!(xml.contains(&format!(
            r#"<Default Extension="rels" ContentType="{}"/>"#,
            ct::OPC_RELATIONSHIPS
        )));
        assert!(xml.contains(&format!(
            r#"<Override PartName="/xl/workbook.xml" ContentType="{}"/>"#,
            ct::SML_SHEET_MAIN
        )));
    }

    #[test]
    fn test_relationship_ids_are_sequential() {
        let mut rels = Relationships::new();
        assert_eq!(rels.add(relationship_type::WORKSHEET, "worksheets/sheet1.xml"), "rId1");
        assert_eq!(rels.add(relationship_type::STYLES, "styles.xml"), "rId2");

        let xml = rels.to_xml().unwrap();
        assert!(xml.contains(&format!(
            r#"<Relationship Id="rId2" Type="{}" Target="styles.xml"/>"#,
            relationship_type::STYLES
        )));
    }

    #[test]
    fn test_core_properties_timestamp() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let xml = core_properties_xml(Some("Matrix"), created).unwrap();
        assert!(xml.contains("<dc:title>Matrix</dc:title>"));
        assert!(xml.contains(r#"<dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T12:30:00Z</dcterms:created>"#));
    }

    #[test]
    fn test_app_properties_lists_sheets() {
        let xml = app_properties_xml(&["A", "B & C"]).unwrap();
        assert!(xml.contains(r#"<vt:vector size="2" baseType="lpstr"><vt:lpstr>A</vt:lpstr><vt:lpstr>B &amp; C</vt:lpstr>"#));
    }
}
