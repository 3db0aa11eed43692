//! Availability Matrix - service and product availability workbooks
//!
//! Models which services are available for each region and language, derives
//! product availability from the services each product depends on, and writes
//! the result as an interactive Excel workbook.
//!
//! # Features
//!
//! - **Worst-wins resolution**: a product is only as available as its least
//!   available dependency (Not Supported > Limited Support > Full Support)
//! - **Fact table**: exactly one status per (region, service, language),
//!   loaded from CSV or generated with weighted odds
//! - **Live workbook**: dashboards use INDEX/MATCH formulas keyed on a region
//!   dropdown, so the spreadsheet re-derives every status on selection
//! - **YAML catalog**: regions, languages, services and product dependencies
//!   are configurable
//!
//! # Example - Resolving a product
//!
//! ```
//! use availability_matrix::{Catalog, Fact, FactTable, Resolver, Status};
//!
//! # fn main() -> availability_matrix::Result<()> {
//! let catalog = Catalog::default();
//! let facts = FactTable::from_facts([
//!     Fact::new("USA", "ASR", "English", Status::FullSupport),
//! ])?;
//!
//! let resolver = Resolver::new(&catalog, &facts);
//! // CRA depends on ASR alone.
//! assert_eq!(resolver.product_status("USA", "CRA", "English")?, Status::FullSupport);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Writing the workbook
//!
//! ```no_run
//! use availability_matrix::{Catalog, FactGenerator, MatrixBuilder};
//!
//! # fn main() -> availability_matrix::Result<()> {
//! let catalog = Catalog::default();
//! let facts = FactGenerator::new(catalog.weights())?.generate(&catalog)?;
//! MatrixBuilder::new(&catalog, &facts).write("Smart_Availability_Matrix.xlsx")?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod facts;
pub mod formula;
pub mod generate;
pub mod matrix;
pub mod resolver;
pub mod status;
pub mod xlsx;

pub use catalog::{Catalog, CatalogConfig, ProductDef, StatusWeights};
pub use error::{Error, Result};
pub use facts::{Fact, FactTable};
pub use generate::FactGenerator;
pub use matrix::{MatrixBuilder, write_matrix};
pub use resolver::{Grid, Resolver, StatusSource};
pub use status::Status;
