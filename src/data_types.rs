/*!
 * Data type definitions for panel records and queries
 *
 * One `DoctorRecord` per spreadsheet row, plus the query types the filter
 * engine accepts.
 */

use serde::{Deserialize, Serialize};
use crate::constants::ALL_REGIONS;

/// NPI (National Provider Identifier)
///
/// Stored numerically because panel spreadsheets carry it as a number cell.
/// Uniqueness across a panel is expected but not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Npi(pub u64);

impl Npi {
    /// Parse an NPI from cell text
    ///
    /// Accepts plain integers and the float rendering spreadsheets produce
    /// for whole numbers (`1234567890.0`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(value) = raw.parse::<u64>() {
            return Some(Npi(value));
        }
        let value = raw.parse::<f64>().ok()?;
        Self::from_f64(value)
    }

    /// Convert a numeric cell, rejecting negatives and fractions
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Some(Npi(value as u64))
        } else {
            None
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Npi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the doctor panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub npi: Npi,
    pub state: String,
    /// Usage time in minutes
    pub usage_minutes: f64,
    pub region: String,
    pub specialty: String,
}

impl DoctorRecord {
    pub fn new(
        npi: u64,
        state: impl Into<String>,
        usage_minutes: f64,
        region: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            npi: Npi(npi),
            state: state.into(),
            usage_minutes,
            region: region.into(),
            specialty: specialty.into(),
        }
    }

    /// False when the Region cell was blank
    pub fn has_region(&self) -> bool {
        !self.region.is_empty()
    }

    /// Usage time rounded for display, e.g. `"42 mins"`
    pub fn usage_display(&self) -> String {
        format!("{:.0} mins", self.usage_minutes)
    }
}

/// Region part of a query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionFilter {
    /// No region filter ("All Regions")
    #[default]
    All,
    /// Only rows in exactly this region
    Only(String),
}

impl RegionFilter {
    /// Interpret a region selector value
    ///
    /// Absent, blank, and the "All Regions" sentinel all mean no filter.
    pub fn from_option(region: Option<&str>) -> Self {
        match region.map(str::trim) {
            None | Some("") => RegionFilter::All,
            Some(r) if r == ALL_REGIONS => RegionFilter::All,
            Some(r) => RegionFilter::Only(r.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RegionFilter::All)
    }
}

impl std::fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionFilter::All => write!(f, "{}", ALL_REGIONS),
            RegionFilter::Only(region) => write!(f, "{}", region),
        }
    }
}

/// A specialty lookup, optionally narrowed to one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub specialty: String,
    pub region: RegionFilter,
}

impl Query {
    pub fn new(specialty: impl Into<String>, region: RegionFilter) -> Self {
        Self {
            specialty: specialty.into(),
            region,
        }
    }

    /// Build a query from raw form values
    pub fn from_inputs(specialty: &str, region: Option<&str>) -> Self {
        Self::new(specialty.trim(), RegionFilter::from_option(region))
    }

    /// Reject a blank specialty
    pub fn validate(&self) -> crate::Result<()> {
        if self.specialty.trim().is_empty() {
            return Err(crate::FinderError::MissingSpecialty);
        }
        Ok(())
    }
}
