//! Service availability facts and their composite-key index.
//!
//! A [`FactTable`] is the single source of truth of a run: one [`Status`]
//! per (region, service, language) triple. The index is keyed by the triple
//! itself, so no separator can make two different triples collide, and a
//! second fact for an existing triple is rejected at insertion.

use crate::catalog::{Catalog, KEY_SEPARATOR};
use crate::error::{Error, Result};
use crate::resolver::StatusSource;
use crate::status::Status;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One row of the fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Service")]
    pub service: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Status")]
    pub status: Status,
}

impl Fact {
    pub fn new(region: &str, service: &str, language: &str, status: Status) -> Self {
        Self {
            region: region.to_string(),
            service: service.to_string(),
            language: language.to_string(),
            status,
        }
    }

    /// The workbook's lookup key, `Region|Service|Language`.
    pub fn key_text(&self) -> String {
        [&self.region, &self.service, &self.language]
            .map(String::as_str)
            .join(&KEY_SEPARATOR.to_string())
    }

    fn key(&self) -> FactKey {
        FactKey::new(&self.region, &self.service, &self.language)
    }
}

/// Composite index key: (region, service, language).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FactKey(String, String, String);

impl FactKey {
    fn new(region: &str, service: &str, language: &str) -> Self {
        Self(region.to_string(), service.to_string(), language.to_string())
    }
}

/// Table of service availability facts.
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    /// Rows in insertion order
    facts: Vec<Fact>,
    /// Triple -> row index
    index: HashMap<FactKey, usize>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, failing on the first duplicate triple.
    pub fn from_facts<I>(facts: I) -> Result<Self>
    where
        I: IntoIterator<Item = Fact>,
    {
        let mut table = Self::new();
        for fact in facts {
            table.insert(fact)?;
        }
        Ok(table)
    }

    /// Read a table from CSV with a `Region,Service,Language,Status` header.
    ///
    /// Extra columns (such as an exported `Lookup_Key`) are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();
        for record in csv_reader.deserialize::<Fact>() {
            table.insert(record?)?;
        }
        Ok(table)
    }

    /// Read a table from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// Insert a fact, rejecting a second row for the same triple.
    pub fn insert(&mut self, fact: Fact) -> Result<()> {
        let key = fact.key();
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateFact {
                region: fact.region,
                service: fact.service,
                language: fact.language,
            });
        }
        self.index.insert(key, self.facts.len());
        self.facts.push(fact);
        Ok(())
    }

    /// Recorded status of a triple; a missing triple is an error.
    pub fn lookup(&self, region: &str, service: &str, language: &str) -> Result<Status> {
        self.index
            .get(&FactKey::new(region, service, language))
            .map(|&row| self.facts[row].status)
            .ok_or_else(|| Error::MissingFact {
                region: region.to_string(),
                service: service.to_string(),
                language: language.to_string(),
            })
    }

    /// All facts in insertion order.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Check the table covers exactly the catalog's axes.
    ///
    /// Every fact must name known axis values, and every
    /// (region, service, language) triple of the catalog must be present.
    pub fn validate_against(&self, catalog: &Catalog) -> Result<()> {
        for fact in &self.facts {
            if !catalog.has_region(&fact.region) {
                return Err(Error::UnknownAxisValue {
                    axis: "region",
                    value: fact.region.clone(),
                });
            }
            if !catalog.has_service(&fact.service) {
                return Err(Error::UnknownAxisValue {
                    axis: "service",
                    value: fact.service.clone(),
                });
            }
            if !catalog.has_language(&fact.language) {
                return Err(Error::UnknownAxisValue {
                    axis: "language",
                    value: fact.language.clone(),
                });
            }
        }

        for region in catalog.regions() {
            for service in catalog.services() {
                for language in catalog.languages() {
                    self.lookup(region, service, language)?;
                }
            }
        }

        Ok(())
    }
}

impl StatusSource for FactTable {
    fn status(&self, region: &str, service: &str, language: &str) -> Result<Status> {
        self.lookup(region, service, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductDef;

    fn tiny_catalog() -> Catalog {
        Catalog::new(
            vec!["USA".to_string()],
            vec!["English".to_string(), "Hindi".to_string()],
            vec!["ASR".to_string()],
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: vec!["ASR".to_string()],
            }],
        )
        .unwrap()
    }

    #[test]
    fn key_text_joins_with_separator() {
        let fact = Fact::new("USA", "KaaS/PKaaS", "English", Status::FullSupport);
        assert_eq!(fact.key_text(), "USA|KaaS/PKaaS|English");
    }

    #[test]
    fn lookup_finds_inserted_fact() {
        let table = FactTable::from_facts([
            Fact::new("USA", "ASR", "English", Status::NotSupported),
            Fact::new("USA", "ASR", "Hindi", Status::FullSupport),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("USA", "ASR", "English").unwrap(),
            Status::NotSupported
        );
        assert_eq!(
            table.lookup("USA", "ASR", "Hindi").unwrap(),
            Status::FullSupport
        );
    }

    #[test]
    fn duplicate_triple_is_rejected() {
        let mut table = FactTable::new();
        table
            .insert(Fact::new("USA", "ASR", "English", Status::FullSupport))
            .unwrap();
        let err = table
            .insert(Fact::new("USA", "ASR", "English", Status::NotSupported))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFact { .. }));
        // The first row stays authoritative.
        assert_eq!(
            table.lookup("USA", "ASR", "English").unwrap(),
            Status::FullSupport
        );
    }

    #[test]
    fn missing_triple_is_an_error() {
        let table = FactTable::new();
        assert!(matches!(
            table.lookup("USA", "ASR", "English"),
            Err(Error::MissingFact { .. })
        ));
    }

    #[test]
    fn separator_in_values_cannot_collide() {
        // With string concatenation both would key as "a|b|c|d".
        let table = FactTable::from_facts([
            Fact::new("a|b", "c", "d", Status::FullSupport),
            Fact::new("a", "b|c", "d", Status::NotSupported),
        ])
        .unwrap();
        assert_eq!(table.lookup("a|b", "c", "d").unwrap(), Status::FullSupport);
        assert_eq!(table.lookup("a", "b|c", "d").unwrap(), Status::NotSupported);
    }

    #[test]
    fn csv_ingestion() {
        let csv = "\
Region,Service,Language,Status,Lookup_Key
USA,ASR,English,Not Supported,USA|ASR|English
USA,ASR,Hindi,Limited Support,USA|ASR|Hindi
";
        let table = FactTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("USA", "ASR", "Hindi").unwrap(),
            Status::LimitedSupport
        );
        assert!(table.validate_against(&tiny_catalog()).is_ok());
    }

    #[test]
    fn csv_with_duplicate_rows_is_rejected() {
        let csv = "\
Region,Service,Language,Status
USA,ASR,English,Not Supported
USA,ASR,English,Full Support
";
        assert!(matches!(
            FactTable::from_csv_reader(csv.as_bytes()),
            Err(Error::DuplicateFact { .. })
        ));
    }

    #[test]
    fn csv_with_bad_status_is_rejected() {
        let csv = "Region,Service,Language,Status\nUSA,ASR,English,Maybe\n";
        assert!(matches!(
            FactTable::from_csv_reader(csv.as_bytes()),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn validate_reports_incomplete_tables() {
        let table =
            FactTable::from_facts([Fact::new("USA", "ASR", "English", Status::FullSupport)])
                .unwrap();
        assert!(matches!(
            table.validate_against(&tiny_catalog()),
            Err(Error::MissingFact { .. })
        ));
    }

    #[test]
    fn validate_reports_unknown_axis_values() {
        let table = FactTable::from_facts([
            Fact::new("USA", "ASR", "English", Status::FullSupport),
            Fact::new("USA", "ASR", "Hindi", Status::FullSupport),
            Fact::new("Mars", "ASR", "English", Status::FullSupport),
        ])
        .unwrap();
        assert!(matches!(
            table.validate_against(&tiny_catalog()),
            Err(Error::UnknownAxisValue { axis: "region", .. })
        ));
    }
}
