//! Command-line generator for the availability workbook.
//!
//! # Usage
//!
//! Default catalog, random facts, default output file:
//! ```sh
//! availability-matrix
//! ```
//!
//! Custom catalog and real facts:
//! ```sh
//! availability-matrix -c catalog.yaml -f facts.csv -o matrix.xlsx
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use availability_matrix::{Catalog, CatalogConfig, FactGenerator, FactTable, MatrixBuilder};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate the service and product availability workbook
#[derive(Parser, Debug)]
#[command(
    name = "availability-matrix",
    about = "Generate a service and product availability matrix workbook",
    long_about = "Writes an Excel workbook with a service fact table, a region-driven service\n\
                  dashboard and a product dashboard whose statuses are derived from the\n\
                  services each product depends on (worst status wins).",
    version
)]
struct Args {
    /// Output workbook path
    ///
    /// Overrides `output` from the configuration file.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// YAML catalog of regions, languages, services and products
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// CSV fact table with Region, Service, Language and Status columns
    ///
    /// Without it, statuses are generated at random.
    #[arg(short, long, value_name = "FACTS")]
    facts: Option<PathBuf>,

    /// Seed for reproducible random facts
    #[arg(long, conflicts_with = "facts")]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading catalog");
            CatalogConfig::from_path(path)?
        },
        None => CatalogConfig::default(),
    };
    let catalog = Catalog::from_config(&config)?;

    let facts = match &args.facts {
        Some(path) => {
            let table = FactTable::from_csv_path(path)?;
            info!(path = %path.display(), facts = table.len(), "ingested service facts");
            table
        },
        None => {
            let mut generator = match args.seed {
                Some(seed) => FactGenerator::seeded(catalog.weights(), seed)?,
                None => FactGenerator::new(catalog.weights())?,
            };
            generator.generate(&catalog)?
        },
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(config.output()));
    MatrixBuilder::new(&catalog, &facts).write(&output)?;

    println!("File '{}' created successfully.", output.display());
    Ok(())
}
