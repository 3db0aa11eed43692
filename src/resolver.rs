//! Fact lookup and product status resolution.
//!
//! The [`Resolver`] applies the worst-wins rule: a product's status for a
//! (region, language) pair is the reduction of the statuses of every service
//! the product depends on. Resolution is all-or-nothing; one missing
//! dependency fails the whole product.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::status::{self, Status};

/// Source of recorded service statuses.
///
/// Implementations must return exactly one status per triple and report a
/// missing triple as [`Error::MissingFact`](crate::Error::MissingFact).
pub trait StatusSource {
    fn status(&self, region: &str, service: &str, language: &str) -> Result<Status>;
}

/// Language × column status grid for one region.
///
/// Rows follow the catalog's language order, columns its service or product
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub region: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<Status>>,
}

impl Grid {
    /// Status at (language, column), if both are part of the grid.
    pub fn get(&self, row: &str, column: &str) -> Option<Status> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.cells[r][c])
    }
}

/// Resolves service and product statuses against a catalog.
pub struct Resolver<'a, S: StatusSource> {
    catalog: &'a Catalog,
    source: &'a S,
}

impl<'a, S: StatusSource> Resolver<'a, S> {
    pub fn new(catalog: &'a Catalog, source: &'a S) -> Self {
        Self { catalog, source }
    }

    /// Recorded status of one service.
    pub fn service_status(&self, region: &str, service: &str, language: &str) -> Result<Status> {
        self.source.status(region, service, language)
    }

    /// Derived status of one product.
    pub fn product_status(&self, region: &str, product: &str, language: &str) -> Result<Status> {
        let dependencies = self.catalog.dependencies(product)?;
        let statuses = dependencies
            .iter()
            .map(|service| self.source.status(region, service, language))
            .collect::<Result<Vec<_>>>()?;
        status::reduce(statuses)
    }

    /// Service dashboard grid for a region.
    pub fn service_grid(&self, region: &str) -> Result<Grid> {
        let columns = self.catalog.services().to_vec();
        self.grid(region, columns, |language, service| {
            self.service_status(region, service, language)
        })
    }

    /// Product dashboard grid for a region.
    pub fn product_grid(&self, region: &str) -> Result<Grid> {
        let columns = self
            .catalog
            .products()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        self.grid(region, columns, |language, product| {
            self.product_status(region, product, language)
        })
    }

    fn grid<F>(&self, region: &str, columns: Vec<String>, resolve: F) -> Result<Grid>
    where
        F: Fn(&str, &str) -> Result<Status>,
    {
        let rows = self.catalog.languages().to_vec();
        let cells = rows
            .iter()
            .map(|language| {
                columns
                    .iter()
                    .map(|column| resolve(language, column))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Grid {
            region: region.to_string(),
            rows,
            columns,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::facts::{Fact, FactTable};
    use crate::status::Status::{
        FullSupport as Full, LimitedSupport as Limited, NotSupported as Not,
    };

    /// USA/English facts from the reference scenario; every other triple is
    /// Full Support.
    fn scenario(nlp: Status) -> (Catalog, FactTable) {
        let catalog = Catalog::default();
        let mut facts = Vec::new();
        for region in catalog.regions() {
            for service in catalog.services() {
                for language in catalog.languages() {
                    let status = match (region.as_str(), service.as_str(), language.as_str()) {
                        ("USA", "ASR", "English") => Not,
                        ("USA", "Gen AI Services", "English") => Full,
                        ("USA", "KaaS/PKaaS", "English") => Limited,
                        ("USA", "NLP Services", "English") => nlp,
                        _ => Full,
                    };
                    facts.push(Fact::new(region, service, language, status));
                }
            }
        }
        (catalog, FactTable::from_facts(facts).unwrap())
    }

    #[test]
    fn end_to_end_scenario() {
        let (catalog, facts) = scenario(Full);
        let resolver = Resolver::new(&catalog, &facts);

        assert_eq!(resolver.product_status("USA", "SSA", "English").unwrap(), Not);
        assert_eq!(resolver.product_status("USA", "CRA", "English").unwrap(), Not);
        assert_eq!(resolver.product_status("USA", "RTGA", "English").unwrap(), Not);
        // CIA only sees NLP and Gen AI.
        assert_eq!(resolver.product_status("USA", "CIA", "English").unwrap(), Full);
    }

    #[test]
    fn cia_follows_nlp_only() {
        let (catalog, facts) = scenario(Limited);
        let resolver = Resolver::new(&catalog, &facts);
        assert_eq!(
            resolver.product_status("USA", "CIA", "English").unwrap(),
            Limited
        );
        // Other languages are untouched.
        assert_eq!(resolver.product_status("USA", "SSA", "Hindi").unwrap(), Full);
    }

    #[test]
    fn all_full_support_products_are_full_support() {
        let (catalog, facts) = scenario(Full);
        let resolver = Resolver::new(&catalog, &facts);
        let grid = resolver.product_grid("Europe").unwrap();
        assert!(grid.cells.iter().flatten().all(|s| *s == Full));
    }

    #[test]
    fn missing_dependency_fails_whole_product() {
        let catalog = Catalog::default();
        let facts = FactTable::from_facts([
            Fact::new("USA", "ASR", "English", Full),
            Fact::new("USA", "Gen AI Services", "English", Full),
        ])
        .unwrap();
        let resolver = Resolver::new(&catalog, &facts);

        // SSA also needs KaaS/PKaaS, which has no fact.
        assert!(matches!(
            resolver.product_status("USA", "SSA", "English"),
            Err(Error::MissingFact { .. })
        ));
        // CRA only needs ASR.
        assert_eq!(resolver.product_status("USA", "CRA", "English").unwrap(), Full);
    }

    #[test]
    fn unknown_product_is_an_error() {
        let (catalog, facts) = scenario(Full);
        let resolver = Resolver::new(&catalog, &facts);
        assert!(matches!(
            resolver.product_status("USA", "XYZ", "English"),
            Err(Error::UnknownProduct(_))
        ));
    }

    #[test]
    fn grids_follow_catalog_order() {
        let (catalog, facts) = scenario(Full);
        let resolver = Resolver::new(&catalog, &facts);

        let services = resolver.service_grid("USA").unwrap();
        assert_eq!(services.rows, catalog.languages());
        assert_eq!(services.columns, catalog.services());
        assert_eq!(services.get("English", "ASR"), Some(Not));
        assert_eq!(services.get("English", "KaaS/PKaaS"), Some(Limited));

        let products = resolver.product_grid("USA").unwrap();
        assert_eq!(products.columns, ["SSA", "RTGA", "CIA", "CRA"]);
        assert_eq!(products.get("English", "SSA"), Some(Not));
        assert_eq!(products.get("English", "CIA"), Some(Full));
        assert_eq!(products.get("Klingon", "SSA"), None);
    }

    struct FixedSource(Status);

    impl StatusSource for FixedSource {
        fn status(&self, _region: &str, _service: &str, _language: &str) -> Result<Status> {
            Ok(self.0)
        }
    }

    #[test]
    fn resolver_works_over_any_source() {
        let catalog = Catalog::default();
        let source = FixedSource(Limited);
        let resolver = Resolver::new(&catalog, &source);
        assert_eq!(
            resolver.product_status("APAC", "RTGA", "Arabic").unwrap(),
            Limited
        );
    }
}
