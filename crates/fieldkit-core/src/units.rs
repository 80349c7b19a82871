//! Unit conversion and label formatting
//!
//! Lengths are carried in metres and areas in square metres everywhere in
//! the engine; this module turns them into label text and parses the
//! lengths a user types into an edge label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnitsError;

const SQ_FT_PER_SQ_M: f64 = 10.763_910_416_709_722;
const SQ_YD_PER_SQ_M: f64 = 1.195_990_046_301_08;
const SQ_M_PER_HECTARE: f64 = 10_000.0;
const M_PER_FOOT: f64 = 0.3048;

/// Distances at or above this are shown in kilometres.
pub const KILOMETRE_THRESHOLD_M: f64 = 1000.0;

/// Length units accepted when typing an edge length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Metres
    Meters,
    /// Kilometres
    Kilometers,
    /// International feet
    Feet,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Meters
    }
}

impl LengthUnit {
    /// Converts a value in this unit to metres.
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            Self::Meters => value,
            Self::Kilometers => value * 1000.0,
            Self::Feet => value * M_PER_FOOT,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Meters => write!(f, "m"),
            Self::Kilometers => write!(f, "km"),
            Self::Feet => write!(f, "ft"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "m" | "meter" | "meters" | "metre" | "metres" => Ok(Self::Meters),
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => Ok(Self::Kilometers),
            "ft" | "foot" | "feet" => Ok(Self::Feet),
            other => Err(UnitsError::UnknownUnit(other.to_string())),
        }
    }
}

/// Area units used in printed and persisted reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaUnit {
    /// Square metres
    SquareMeters,
    /// Square feet
    SquareFeet,
    /// Square yards
    SquareYards,
    /// Hectares
    Hectares,
}

impl AreaUnit {
    /// All report units, in display order.
    pub const ALL: [AreaUnit; 4] = [
        AreaUnit::SquareMeters,
        AreaUnit::SquareFeet,
        AreaUnit::SquareYards,
        AreaUnit::Hectares,
    ];

    /// Converts square metres into this unit.
    pub fn from_square_meters(self, m2: f64) -> f64 {
        match self {
            Self::SquareMeters => m2,
            Self::SquareFeet => m2 * SQ_FT_PER_SQ_M,
            Self::SquareYards => m2 * SQ_YD_PER_SQ_M,
            Self::Hectares => m2 / SQ_M_PER_HECTARE,
        }
    }
}

impl fmt::Display for AreaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SquareMeters => write!(f, "m²"),
            Self::SquareFeet => write!(f, "ft²"),
            Self::SquareYards => write!(f, "yd²"),
            Self::Hectares => write!(f, "ha"),
        }
    }
}

/// Area of one field expressed in every report unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaReport {
    pub square_meters: f64,
    pub square_feet: f64,
    pub square_yards: f64,
    pub hectares: f64,
}

impl AreaReport {
    /// Builds a report from an area in square metres. The sign is dropped.
    pub fn from_square_meters(m2: f64) -> Self {
        let m2 = m2.abs();
        Self {
            square_meters: m2,
            square_feet: AreaUnit::SquareFeet.from_square_meters(m2),
            square_yards: AreaUnit::SquareYards.from_square_meters(m2),
            hectares: AreaUnit::Hectares.from_square_meters(m2),
        }
    }

    /// Value for a single unit.
    pub fn get(&self, unit: AreaUnit) -> f64 {
        match unit {
            AreaUnit::SquareMeters => self.square_meters,
            AreaUnit::SquareFeet => self.square_feet,
            AreaUnit::SquareYards => self.square_yards,
            AreaUnit::Hectares => self.hectares,
        }
    }

    /// One formatted line per unit, two decimals each.
    pub fn lines(&self) -> Vec<String> {
        AreaUnit::ALL
            .iter()
            .map(|unit| format!("{:.2} {}", self.get(*unit), unit))
            .collect()
    }
}

impl fmt::Display for AreaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join(" | "))
    }
}

/// Format a length for an edge label
///
/// Below one kilometre the value is rounded to whole metres, otherwise it is
/// shown in kilometres with two decimals.
pub fn format_distance(meters: f64) -> String {
    let meters = if meters.is_finite() { meters.abs() } else { 0.0 };
    if meters < KILOMETRE_THRESHOLD_M {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

/// Format an area for the live banner, in hectares with two decimals
pub fn format_area_hectares(square_meters: f64) -> String {
    let m2 = if square_meters.is_finite() {
        square_meters.abs()
    } else {
        0.0
    };
    format!("{:.2} ha", AreaUnit::Hectares.from_square_meters(m2))
}

/// Parse a typed edge length into metres
///
/// Accepts a bare number (metres) or a number followed by a unit suffix,
/// with or without a space: `"120"`, `"120 m"`, `"1.5km"`, `"300 ft"`.
pub fn parse_distance(input: &str) -> Result<f64, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::InvalidLength(input.to_string()));
    }

    let split = input
        .find(|c: char| c.is_alphabetic())
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);
    let value: f64 = number
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| UnitsError::InvalidLength(input.to_string()))?;
    if !value.is_finite() {
        return Err(UnitsError::InvalidLength(input.to_string()));
    }

    let unit: LengthUnit = unit.trim().parse()?;
    Ok(unit.to_meters(value))
}
