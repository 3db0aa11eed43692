//! Random fact generation.
//!
//! Produces the full factorial region × service × language table with each
//! status drawn independently from weighted odds. This stands in for real
//! data ingestion (see [`FactTable::from_csv_path`]).

use crate::catalog::{Catalog, StatusWeights};
use crate::error::{Error, Result};
use crate::facts::{Fact, FactTable};
use crate::status::Status;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Weighted random generator of service availability facts.
#[derive(Debug, Clone)]
pub struct FactGenerator {
    distribution: WeightedIndex<u32>,
    rng: StdRng,
}

impl FactGenerator {
    /// Generator seeded from OS entropy; every run differs.
    pub fn new(weights: StatusWeights) -> Result<Self> {
        Self::with_rng(weights, StdRng::from_os_rng())
    }

    /// Reproducible generator.
    pub fn seeded(weights: StatusWeights, seed: u64) -> Result<Self> {
        Self::with_rng(weights, StdRng::seed_from_u64(seed))
    }

    fn with_rng(weights: StatusWeights, rng: StdRng) -> Result<Self> {
        let distribution = WeightedIndex::new(weights.as_array())
            .map_err(|e| Error::Config(format!("invalid status weights: {}", e)))?;
        Ok(Self { distribution, rng })
    }

    /// Draw one status.
    pub fn next_status(&mut self) -> Status {
        Status::ALL[self.distribution.sample(&mut self.rng)]
    }

    /// Generate one fact per catalog triple, region-major then service then
    /// language, which is also the row order of the fact sheet.
    pub fn generate(&mut self, catalog: &Catalog) -> Result<FactTable> {
        let mut table = FactTable::new();
        for region in catalog.regions() {
            for service in catalog.services() {
                for language in catalog.languages() {
                    let status = self.next_status();
                    table.insert(Fact::new(region, service, language, status))?;
                }
            }
            debug!(region = %region, "generated region facts");
        }
        info!(facts = table.len(), "generated service availability facts");
        Ok(table)
    }
}
