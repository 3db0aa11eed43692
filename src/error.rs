//! Error types for availability matrix generation.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the single [`Error`] enum below.
use thiserror::Error;

/// Result type for availability matrix operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for availability matrix operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error while writing the package
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// CSV error while ingesting a fact table
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML configuration could not be parsed
    #[error("YAML error: {0}")]
    Yaml(String),

    /// XML generation failed
    #[error("XML write error: {0}")]
    Xml(#[from] std::fmt::Error),

    /// Catalog configuration is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Status text is not one of the three known values
    #[error("Invalid status: {0:?}")]
    InvalidStatus(String),

    /// A fact names a region, service or language the catalog does not know
    #[error("Unknown {axis}: {value:?}")]
    UnknownAxisValue { axis: &'static str, value: String },

    /// A product name has no dependency definition
    #[error("Unknown product: {0:?}")]
    UnknownProduct(String),

    /// A second fact was supplied for an existing (region, service, language) triple
    #[error("Duplicate fact for region {region:?}, service {service:?}, language {language:?}")]
    DuplicateFact {
        region: String,
        service: String,
        language: String,
    },

    /// No fact exists for a (region, service, language) triple
    #[error("No fact for region {region:?}, service {service:?}, language {language:?}")]
    MissingFact {
        region: String,
        service: String,
        language: String,
    },

    /// A status reduction was asked to fold an empty collection
    #[error("Cannot reduce an empty dependency set")]
    EmptyDependencySet,
}
