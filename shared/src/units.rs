//! Type-safe physical units for optical image geometry
//!
//! Lengths are carried as `uom` quantities internally. The accessor layer
//! still speaks in short unit tokens ("mm", "um", ...), so this module also
//! provides [`LengthUnit`], a closed set of the tokens the geometry getters
//! accept, together with the power-of-ten factor that converts a value in
//! meters into that unit.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uom::si::length::{centimeter, meter, micrometer, millimeter, nanometer};

/// Type alias for length measurements with convenient methods
pub type Length = uom::si::f64::Length;

/// Errors raised when parsing a unit token
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Unknown length unit: {0}")]
    Unknown(String),
}

/// Extension trait for length conversions commonly used in optics and sensors
pub trait LengthExt {
    /// Create length from nanometers (wavelengths)
    fn from_nanometers(nm: f64) -> Self;

    /// Get length in nanometers
    fn as_nanometers(&self) -> f64;

    /// Create length from micrometers (sample spacing)
    fn from_micrometers(um: f64) -> Self;

    /// Get length in micrometers
    fn as_micrometers(&self) -> f64;

    /// Create length from millimeters
    fn from_millimeters(mm: f64) -> Self;

    /// Get length in millimeters
    fn as_millimeters(&self) -> f64;

    /// Create length from meters
    fn from_meters(m: f64) -> Self;

    /// Get length in meters
    fn as_meters(&self) -> f64;

    /// Get length expressed in an arbitrary [`LengthUnit`]
    fn as_unit(&self, unit: LengthUnit) -> f64;
}

impl LengthExt for Length {
    fn from_nanometers(nm: f64) -> Self {
        Length::new::<nanometer>(nm)
    }

    fn as_nanometers(&self) -> f64 {
        self.get::<nanometer>()
    }

    fn from_micrometers(um: f64) -> Self {
        Length::new::<micrometer>(um)
    }

    fn as_micrometers(&self) -> f64 {
        self.get::<micrometer>()
    }

    fn from_millimeters(mm: f64) -> Self {
        Length::new::<millimeter>(mm)
    }

    fn as_millimeters(&self) -> f64 {
        self.get::<millimeter>()
    }

    fn from_meters(m: f64) -> Self {
        Length::new::<meter>(m)
    }

    fn as_meters(&self) -> f64 {
        self.get::<meter>()
    }

    fn as_unit(&self, unit: LengthUnit) -> f64 {
        match unit {
            LengthUnit::Meters => self.get::<meter>(),
            LengthUnit::Centimeters => self.get::<centimeter>(),
            LengthUnit::Millimeters => self.get::<millimeter>(),
            LengthUnit::Micrometers => self.get::<micrometer>(),
            LengthUnit::Nanometers => self.get::<nanometer>(),
        }
    }
}

/// Length units accepted as a trailing token on geometric getters.
///
/// Meters is the natural unit; every other unit is a fixed power of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Meters,
    Centimeters,
    Millimeters,
    Micrometers,
    Nanometers,
}

impl LengthUnit {
    /// Multiplier converting a value in meters into this unit
    pub fn scale_from_meters(self) -> f64 {
        Length::from_meters(1.0).as_unit(self)
    }

    /// Multiplier converting an area in square meters into this unit squared
    pub fn area_scale_from_meters(self) -> f64 {
        let s = self.scale_from_meters();
        s * s
    }

    /// Canonical short token for this unit
    pub fn token(self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Millimeters => "mm",
            LengthUnit::Micrometers => "um",
            LengthUnit::Nanometers => "nm",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        match token.as_str() {
            "" | "m" | "meter" | "meters" => Ok(LengthUnit::Meters),
            "cm" | "centimeter" | "centimeters" => Ok(LengthUnit::Centimeters),
            "mm" | "millimeter" | "millimeters" => Ok(LengthUnit::Millimeters),
            "um" | "micron" | "microns" | "micrometer" | "micrometers" => {
                Ok(LengthUnit::Micrometers)
            }
            "nm" | "nanometer" | "nanometers" => Ok(LengthUnit::Nanometers),
            _ => Err(UnitError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
