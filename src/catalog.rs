//! Axis sets, product dependencies and their YAML configuration.
//!
//! A [`Catalog`] fixes the regions, languages, services and products a run
//! covers, plus the services each product depends on. It is built from a
//! [`CatalogConfig`], which may be loaded from YAML; every field left out of
//! the file falls back to the built-in defaults.
//!
//! # Examples
//!
//! ```rust
//! use availability_matrix::catalog::{Catalog, CatalogConfig};
//!
//! let config = CatalogConfig::from_yaml_str("regions: [USA, Europe]\n")?;
//! let catalog = Catalog::from_config(&config)?;
//! assert_eq!(catalog.regions(), ["USA", "Europe"]);
//! assert_eq!(catalog.products().len(), 4);
//! # Ok::<(), availability_matrix::Error>(())
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Separator used inside the workbook's composite lookup keys.
///
/// Names may not contain it, so `Region|Service|Language` keys never collide.
pub const KEY_SEPARATOR: char = '|';

/// Characters spreadsheet `MATCH` treats as wildcards in its lookup value.
const MATCH_WILDCARDS: [char; 3] = ['*', '?', '~'];

/// Longest comma-separated list literal a list data validation accepts.
const MAX_DROPDOWN_LIST_LEN: usize = 255;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "Smart_Availability_Matrix.xlsx";

const DEFAULT_REGIONS: [&str; 5] = ["USA", "Europe", "UAE", "APAC", "Saudi"];
const DEFAULT_LANGUAGES: [&str; 7] = [
    "English", "Hindi", "Spanish", "German", "Arabic", "French", "Italian",
];
const DEFAULT_SERVICES: [&str; 4] = ["ASR", "NLP Services", "Gen AI Services", "KaaS/PKaaS"];
const DEFAULT_PRODUCTS: [(&str, &[&str]); 4] = [
    ("SSA", &["ASR", "Gen AI Services", "KaaS/PKaaS"]),
    (
        "RTGA",
        &["ASR", "NLP Services", "Gen AI Services", "KaaS/PKaaS"],
    ),
    ("CIA", &["NLP Services", "Gen AI Services"]),
    ("CRA", &["ASR"]),
];

/// A product and the services it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDef {
    /// Product name (column header on the product dashboard)
    pub name: String,
    /// Services whose statuses are reduced into the product status
    pub depends_on: Vec<String>,
}

/// Relative weights for random status generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusWeights {
    pub full_support: u32,
    pub limited_support: u32,
    pub not_supported: u32,
}

impl Default for StatusWeights {
    fn default() -> Self {
        Self {
            full_support: 40,
            limited_support: 30,
            not_supported: 30,
        }
    }
}

impl StatusWeights {
    /// Weights in [`Status::ALL`](crate::Status::ALL) order.
    pub fn as_array(&self) -> [u32; 3] {
        [self.full_support, self.limited_support, self.not_supported]
    }
}

/// User-facing configuration, as read from YAML.
///
/// Every field is optional; missing fields take the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Output workbook path
    pub output: Option<String>,
    pub regions: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub services: Option<Vec<String>>,
    pub products: Option<Vec<ProductDef>>,
    /// Weights used when facts are generated rather than ingested
    pub weights: Option<StatusWeights>,
}

impl CatalogConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml).map_err(|e| Error::Yaml(e.to_string()))
    }

    /// Load a configuration from a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Output path, falling back to [`DEFAULT_OUTPUT`].
    pub fn output(&self) -> &str {
        self.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }
}

/// Validated axis sets and product dependencies for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    regions: Vec<String>,
    languages: Vec<String>,
    services: Vec<String>,
    products: Vec<ProductDef>,
    weights: StatusWeights,
}

impl Default for Catalog {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            regions: owned(&DEFAULT_REGIONS),
            languages: owned(&DEFAULT_LANGUAGES),
            services: owned(&DEFAULT_SERVICES),
            products: DEFAULT_PRODUCTS
                .iter()
                .map(|(name, deps)| ProductDef {
                    name: name.to_string(),
                    depends_on: owned(deps),
                })
                .collect(),
            weights: StatusWeights::default(),
        }
    }
}

impl Catalog {
    /// Build and validate a catalog from explicit parts.
    pub fn new(
        regions: Vec<String>,
        languages: Vec<String>,
        services: Vec<String>,
        products: Vec<ProductDef>,
    ) -> Result<Self> {
        let catalog = Self {
            regions,
            languages,
            services,
            products,
            weights: StatusWeights::default(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from configuration, filling gaps with defaults.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let defaults = Self::default();
        let catalog = Self {
            regions: config.regions.clone().unwrap_or(defaults.regions),
            languages: config.languages.clone().unwrap_or(defaults.languages),
            services: config.services.clone().unwrap_or(defaults.services),
            products: config.products.clone().unwrap_or(defaults.products),
            weights: config.weights.unwrap_or(defaults.weights),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Replace the generation weights.
    pub fn with_weights(mut self, weights: StatusWeights) -> Result<Self> {
        self.weights = weights;
        self.validate()?;
        Ok(self)
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn products(&self) -> &[ProductDef] {
        &self.products
    }

    pub fn weights(&self) -> StatusWeights {
        self.weights
    }

    /// Dependency set of a product.
    pub fn dependencies(&self, product: &str) -> Result<&[String]> {
        self.products
            .iter()
            .find(|p| p.name == product)
            .map(|p| p.depends_on.as_slice())
            .ok_or_else(|| Error::UnknownProduct(product.to_string()))
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }

    /// Number of (region, service, language) triples the catalog spans.
    pub fn fact_count(&self) -> usize {
        self.regions.len() * self.services.len() * self.languages.len()
    }

    fn validate(&self) -> Result<()> {
        validate_axis("region", &self.regions)?;
        validate_axis("language", &self.languages)?;
        validate_axis("service", &self.services)?;

        // Regions are joined into the dropdown's comma-separated list literal.
        if let Some(region) = self.regions.iter().find(|r| r.contains(',')) {
            return Err(Error::Config(format!(
                "region name {:?} may not contain ','",
                region
            )));
        }
        let list_len = self.regions.iter().map(|r| r.chars().count()).sum::<usize>()
            + self.regions.len().saturating_sub(1);
        if list_len > MAX_DROPDOWN_LIST_LEN {
            return Err(Error::Config(format!(
                "region list is {} characters long; the dropdown allows at most {}",
                list_len, MAX_DROPDOWN_LIST_LEN
            )));
        }

        let product_names: Vec<String> = self.products.iter().map(|p| p.name.clone()).collect();
        validate_axis("product", &product_names)?;

        for product in &self.products {
            if product.depends_on.is_empty() {
                return Err(Error::Config(format!(
                    "product {:?} has an empty dependency set",
                    product.name
                )));
            }
            let mut seen = HashSet::new();
            for service in &product.depends_on {
                if !self.has_service(service) {
                    return Err(Error::Config(format!(
                        "product {:?} depends on unknown service {:?}",
                        product.name, service
                    )));
                }
                if !seen.insert(service.as_str()) {
                    return Err(Error::Config(format!(
                        "product {:?} lists service {:?} twice",
                        product.name, service
                    )));
                }
            }
        }

        if self.weights.as_array().iter().all(|w| *w == 0) {
            return Err(Error::Config("status weights are all zero".to_string()));
        }

        Ok(())
    }
}

fn validate_axis(axis: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::Config(format!("no {} names configured", axis)));
    }
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(Error::Config(format!("empty {} name", axis)));
        }
        if name.contains(KEY_SEPARATOR) {
            return Err(Error::Config(format!(
                "{} name {:?} may not contain {:?}",
                axis, name, KEY_SEPARATOR
            )));
        }
        if let Some(c) = name.chars().find(|c| MATCH_WILDCARDS.contains(c)) {
            return Err(Error::Config(format!(
                "{} name {:?} may not contain {:?}",
                axis, name, c
            )));
        }
        // Workbook lookups compare case-insensitively.
        if !seen.insert(name.to_lowercase()) {
            return Err(Error::Config(format!("duplicate {} name {:?}", axis, name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_catalog_matches_reference_axes() {
        let catalog = Catalog::default();
        assert_eq!(catalog.regions().len(), 5);
        assert_eq!(catalog.languages().len(), 7);
        assert_eq!(catalog.services().len(), 4);
        assert_eq!(catalog.fact_count(), 140);
        assert_eq!(
            catalog.dependencies("SSA").unwrap(),
            ["ASR", "Gen AI Services", "KaaS/PKaaS"]
        );
        assert_eq!(catalog.dependencies("CRA").unwrap(), ["ASR"]);
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn unknown_product_is_an_error() {
        let catalog = Catalog::default();
        assert!(matches!(
            catalog.dependencies("XYZ"),
            Err(Error::UnknownProduct(_))
        ));
    }

    #[test]
    fn rejects_key_separator_in_names() {
        let err = Catalog::new(
            names(&["USA"]),
            names(&["English"]),
            names(&["A|B"]),
            vec![ProductDef {
                name: "P".to_string(),
                depends_on: names(&["A|B"]),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_comma_in_region() {
        let err = Catalog::new(
            names(&["USA, East"]),
            names(&["English"]),
            names(&["ASR"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["ASR"]),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_match_wildcards_in_names() {
        for service in ["A?R", "A*R", "A~R"] {
            let err = Catalog::new(
                names(&["USA"]),
                names(&["English"]),
                names(&["ASR", service]),
                vec![ProductDef {
                    name: "P".to_string(),
                    depends_on: names(&[service]),
                }],
            );
            assert!(matches!(err, Err(Error::Config(_))), "{service} accepted");
        }
    }

    #[test]
    fn rejects_names_differing_only_by_case() {
        let regions = Catalog::new(
            names(&["USA", "usa"]),
            names(&["English"]),
            names(&["ASR"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["ASR"]),
            }],
        );
        assert!(matches!(regions, Err(Error::Config(_))));

        let services = Catalog::new(
            names(&["USA"]),
            names(&["English"]),
            names(&["ASR", "asr"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["ASR"]),
            }],
        );
        assert!(matches!(services, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_region_list_longer_than_dropdown_limit() {
        let product = || {
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["ASR"]),
            }]
        };
        // 25 names of 9 characters plus 24 commas: 249 characters.
        let fits: Vec<String> = (0..25).map(|i| format!("Region_{:02}", i)).collect();
        assert!(Catalog::new(fits, names(&["English"]), names(&["ASR"]), product()).is_ok());

        let too_long: Vec<String> = (0..26).map(|i| format!("Region_{:02}", i)).collect();
        let err = Catalog::new(too_long, names(&["English"]), names(&["ASR"]), product());
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_empty_and_unknown_dependencies() {
        let empty = Catalog::new(
            names(&["USA"]),
            names(&["English"]),
            names(&["ASR"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: Vec::new(),
            }],
        );
        assert!(matches!(empty, Err(Error::Config(_))));

        let unknown = Catalog::new(
            names(&["USA"]),
            names(&["English"]),
            names(&["ASR"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["TTS"]),
            }],
        );
        assert!(matches!(unknown, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Catalog::new(
            names(&["USA", "USA"]),
            names(&["English"]),
            names(&["ASR"]),
            vec![ProductDef {
                name: "CRA".to_string(),
                depends_on: names(&["ASR"]),
            }],
        );
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_all_zero_weights() {
        let err = Catalog::default().with_weights(StatusWeights {
            full_support: 0,
            limited_support: 0,
            not_supported: 0,
        });
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn yaml_overrides_only_given_fields() {
        let yaml = "\
output: custom.xlsx
languages: [English, German]
products:
  - name: CRA
    depends_on: [ASR]
weights:
  full_support: 1
  limited_support: 0
  not_supported: 0
";
        let config = CatalogConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.output(), "custom.xlsx");

        let catalog = Catalog::from_config(&config).unwrap();
        assert_eq!(catalog.regions().len(), 5);
        assert_eq!(catalog.languages(), ["English", "German"]);
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.weights().as_array(), [1, 0, 0]);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = CatalogConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.output(), DEFAULT_OUTPUT);
        assert_eq!(Catalog::from_config(&config).unwrap(), Catalog::default());
    }

    #[test]
    fn yaml_with_unknown_field_is_rejected() {
        assert!(matches!(
            CatalogConfig::from_yaml_str("colour: red\n"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn invalid_yaml_config_is_rejected_at_catalog_build() {
        let config = CatalogConfig::from_yaml_str("services: [ASR]\n").unwrap();
        // Default products reference services that are no longer configured.
        assert!(matches!(
            Catalog::from_config(&config),
            Err(Error::Config(_))
        ));
    }
}
