//! The three-valued status domain and its worst-wins reduction.
//!
//! Statuses are ordered by severity:
//! `FullSupport < LimitedSupport < NotSupported`. A composite takes the most
//! severe status among its parts, so reduction is a fold over [`Ord::max`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Availability status of a service or product.
///
/// Variant order is severity order; the derived `Ord` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Full Support")]
    FullSupport,
    #[serde(rename = "Limited Support")]
    LimitedSupport,
    #[serde(rename = "Not Supported")]
    NotSupported,
}

impl Status {
    /// All statuses, least severe first.
    pub const ALL: [Status; 3] = [
        Status::FullSupport,
        Status::LimitedSupport,
        Status::NotSupported,
    ];

    /// Display text, as written into the workbook and matched by its formulas.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullSupport => "Full Support",
            Self::LimitedSupport => "Limited Support",
            Self::NotSupported => "Not Supported",
        }
    }

    /// The more severe of two statuses.
    #[inline]
    pub fn worst(self, other: Status) -> Status {
        self.max(other)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidStatus(s.to_string()))
    }
}

/// Reduce a collection of dependency statuses to the single worst one.
///
/// An empty collection is an error rather than an implicit
/// [`Status::FullSupport`].
pub fn reduce<I>(statuses: I) -> Result<Status>
where
    I: IntoIterator<Item = Status>,
{
    statuses
        .into_iter()
        .reduce(Status::worst)
        .ok_or(Error::EmptyDependencySet)
}
