/// Shared strings table for XLSX workbooks.
use crate::error::Result;
use crate::xlsx::escape_xml;
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

/// Shared strings table.
///
/// Excel stores repeated strings once in `xl/sharedStrings.xml` and has
/// cells refer to them by index. Region, service and status names repeat
/// on every fact row, so this keeps the fact sheet small.
#[derive(Debug, Default)]
pub struct SharedStrings {
    /// List of unique strings
    strings: Vec<String>,
    /// Map from string to index for fast lookup
    string_to_index: HashMap<String, usize>,
    /// Total number of references, including repeats
    references: usize,
}

impl SharedStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string reference and return its index.
    ///
    /// If the string already exists, returns the existing index.
    pub fn add_string(&mut self, s: &str) -> usize {
        self.references += 1;
        if let Some(&index) = self.string_to_index.get(s) {
            index
        } else {
            let index = self.strings.len();
            self.strings.push(s.to_string());
            self.string_to_index.insert(s.to_string(), index);
            index
        }
    }

    /// Number of unique strings.
    pub fn count(&self) -> usize {
        self.strings.len()
    }

    /// Serialize the table to XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(64 + self.strings.len() * 32);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        )?;

        for s in &self.strings {
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s))?;
            } else {
                write!(xml, "<si><t>{}</t></si>", escape_xml(s))?;
            }
        }

        xml.push_str("</sst>");

        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_strings() {
        let mut ss = SharedStrings::new();
        let idx1 = ss.add_string("USA");
        let idx2 = ss.add_string("ASR");
        let idx3 = ss.add_string("USA"); // Duplicate

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(ss.count(), 2);
    }

    #[test]
    fn test_counts_in_xml() {
        let mut ss = SharedStrings::new();
        ss.add_string("Full Support");
        ss.add_string("Full Support");
        ss.add_string("KaaS/PKaaS & more");

        let xml = ss.to_xml().unwrap();
        assert!(xml.contains(r#"count="3" uniqueCount="2""#));
        assert!(xml.contains("<si><t>KaaS/PKaaS &amp; more</t></si>"));
    }
}
