//! Facility types and their catalog entries
//!
//! A facility is chosen once per session and selects the recovery rate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of site the recovery unit is installed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityType {
    /// Retail gas station
    #[default]
    Gas,
    /// Bulk storage terminal
    Storage,
}

/// Error returned when a facility name is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown facility type '{0}' (expected 'gas' or 'storage')")]
pub struct FacilityParseError(pub String);

/// Static description of a facility type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityProfile {
    /// Facility this profile describes
    pub facility: FacilityType,
    /// Short machine name
    pub key: &'static str,
    /// Name shown to users
    pub display_name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Default recovery rate (L/s)
    pub recovery_rate_lps: f64,
}

static CATALOG: [FacilityProfile; 2] = [
    FacilityProfile {
        facility: FacilityType::Gas,
        key: "gas",
        display_name: "Gas Station",
        description: "Retail forecourt with underground tanks and tanker deliveries",
        recovery_rate_lps: 0.5,
    },
    FacilityProfile {
        facility: FacilityType::Storage,
        key: "storage",
        display_name: "Storage Terminal",
        description: "Bulk fuel terminal with above-ground tanks and truck loading racks",
        recovery_rate_lps: 5.0,
    },
];

/// All known facility profiles
pub fn catalog() -> &'static [FacilityProfile] {
    &CATALOG
}

impl FacilityType {
    /// All facility types in catalog order
    pub const ALL: [FacilityType; 2] = [FacilityType::Gas, FacilityType::Storage];

    /// Catalog entry for this facility
    pub fn profile(self) -> &'static FacilityProfile {
        match self {
            FacilityType::Gas => &CATALOG[0],
            FacilityType::Storage => &CATALOG[1],
        }
    }

    /// Default recovery rate (L/s)
    pub fn default_rate(self) -> f64 {
        self.profile().recovery_rate_lps
    }

    /// Short machine name
    pub fn as_str(self) -> &'static str {
        self.profile().key
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityType {
    type Err = FacilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gas" | "gas_station" | "station" => Ok(FacilityType::Gas),
            "storage" | "terminal" => Ok(FacilityType::Storage),
            _ => Err(FacilityParseError(s.to_string())),
        }
    }
}
