//! Optics parameter block owned by an optical image.
//!
//! Holds the imaging model, f-number and focal length needed for the
//! geometric pass-through quantities, plus the nested [`Lens`]. The
//! aperture diameter and numerical aperture are derived on read.

pub mod lens;

use std::fmt;
use std::str::FromStr;

use shared::units::{Length, LengthExt, LengthUnit};

pub use lens::{Lens, LensParam};

use crate::param::{strip_namespace, ParamError, ParamValue};
use crate::spectral::WaveSamples;

/// How the optics propagate a scene into an optical image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpticsModel {
    #[default]
    DiffractionLimited,
    ShiftInvariant,
    RayTrace,
    /// Pass the scene through unchanged
    Skip,
}

impl FromStr for OpticsModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(&[' ', '_', '-'][..], "").as_str() {
            "diffractionlimited" | "dlmtf" => Ok(OpticsModel::DiffractionLimited),
            "shiftinvariant" | "custom" => Ok(OpticsModel::ShiftInvariant),
            "raytrace" => Ok(OpticsModel::RayTrace),
            "skip" => Ok(OpticsModel::Skip),
            _ => Err(format!(
                "Unknown optics model: {}. Valid options: diffraction limited, shift invariant, ray trace, skip",
                s
            )),
        }
    }
}

impl fmt::Display for OpticsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpticsModel::DiffractionLimited => "diffraction limited",
            OpticsModel::ShiftInvariant => "shift invariant",
            OpticsModel::RayTrace => "ray trace",
            OpticsModel::Skip => "skip",
        };
        f.write_str(name)
    }
}

/// Relative illumination falloff away from the optical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffAxis {
    #[default]
    Cos4th,
    Skip,
}

impl FromStr for OffAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cos4th" => Ok(OffAxis::Cos4th),
            "skip" | "none" => Ok(OffAxis::Skip),
            _ => Err(format!("Unknown off-axis method: {}. Valid options: cos4th, skip", s)),
        }
    }
}

impl fmt::Display for OffAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffAxis::Cos4th => f.write_str("cos4th"),
            OffAxis::Skip => f.write_str("skip"),
        }
    }
}

/// Accessor vocabulary for [`Optics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpticsParam {
    Name,
    Model,
    FNumber,
    FocalLength(LengthUnit),
    /// Optical power in diopters
    Power,
    ApertureDiameter(LengthUnit),
    NumericalAperture,
    OffAxis,
    Lens(LensParam),
}

impl OpticsParam {
    /// Resolve a normalized name with any `optics` prefix already removed.
    ///
    /// Names starting with `lens` are forwarded to [`LensParam::parse`].
    pub fn parse(name: &str, unit: LengthUnit) -> Result<Self, ParamError> {
        if let Some(rest) = strip_namespace(name, "lens") {
            return LensParam::parse(rest).map(OpticsParam::Lens);
        }
        match name {
            "name" => Ok(OpticsParam::Name),
            "model" => Ok(OpticsParam::Model),
            "fnumber" | "f#" => Ok(OpticsParam::FNumber),
            "focallength" | "flength" => Ok(OpticsParam::FocalLength(unit)),
            "power" | "diopters" => Ok(OpticsParam::Power),
            "aperturediameter" | "diameter" | "pupildiameter" => {
                Ok(OpticsParam::ApertureDiameter(unit))
            }
            "numericalaperture" | "na" => Ok(OpticsParam::NumericalAperture),
            "offaxis" | "offaxismethod" => Ok(OpticsParam::OffAxis),
            other => Err(ParamError::UnknownParameter(format!("optics {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Optics {
    name: String,
    model: OpticsModel,
    f_number: f64,
    focal_length: Length,
    off_axis: OffAxis,
    lens: Lens,
}

impl Optics {
    /// Default f-number
    pub const DEFAULT_F_NUMBER: f64 = 4.0;

    /// Default focal length
    pub const DEFAULT_FOCAL_LENGTH_MM: f64 = 3.86;

    /// Diffraction-limited optics with a default lens on `wave`
    pub fn new(wave: WaveSamples) -> Self {
        Self {
            name: "optics".to_string(),
            model: OpticsModel::default(),
            f_number: Self::DEFAULT_F_NUMBER,
            focal_length: Length::from_millimeters(Self::DEFAULT_FOCAL_LENGTH_MM),
            off_axis: OffAxis::default(),
            lens: Lens::new(wave),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> OpticsModel {
        self.model
    }

    pub fn set_model(&mut self, model: OpticsModel) {
        self.model = model;
    }

    pub fn f_number(&self) -> f64 {
        self.f_number
    }

    pub fn set_f_number(&mut self, f_number: f64) -> Result<(), ParamError> {
        positive("optics f-number", f_number)?;
        self.f_number = f_number;
        Ok(())
    }

    pub fn focal_length(&self) -> Length {
        self.focal_length
    }

    pub fn set_focal_length(&mut self, focal_length: Length) -> Result<(), ParamError> {
        positive("optics focal length", focal_length.as_meters())?;
        self.focal_length = focal_length;
        Ok(())
    }

    /// Entrance aperture diameter, focal length / f-number
    pub fn aperture_diameter(&self) -> Length {
        Length::from_meters(self.focal_length.as_meters() / self.f_number)
    }

    /// Image-space numerical aperture, 1 / (2N)
    pub fn numerical_aperture(&self) -> f64 {
        1.0 / (2.0 * self.f_number)
    }

    pub fn power_diopters(&self) -> f64 {
        1.0 / self.focal_length.as_meters()
    }

    pub fn off_axis(&self) -> OffAxis {
        self.off_axis
    }

    pub fn lens(&self) -> &Lens {
        &self.lens
    }

    pub fn lens_mut(&mut self) -> &mut Lens {
        &mut self.lens
    }

    pub fn set_lens(&mut self, lens: Lens) {
        self.lens = lens;
    }

    /// Move the working wavelength grid of every spectral component
    pub fn set_wave(&mut self, wave: WaveSamples) {
        self.lens.set_wave(wave);
    }

    pub fn get_param(&self, param: OpticsParam) -> ParamValue {
        match param {
            OpticsParam::Name => ParamValue::Text(self.name.clone()),
            OpticsParam::Model => ParamValue::Text(self.model.to_string()),
            OpticsParam::FNumber => ParamValue::Scalar(self.f_number),
            OpticsParam::FocalLength(unit) => ParamValue::Scalar(self.focal_length.as_unit(unit)),
            OpticsParam::Power => ParamValue::Scalar(self.power_diopters()),
            OpticsParam::ApertureDiameter(unit) => {
                ParamValue::Scalar(self.aperture_diameter().as_unit(unit))
            }
            OpticsParam::NumericalAperture => ParamValue::Scalar(self.numerical_aperture()),
            OpticsParam::OffAxis => ParamValue::Text(self.off_axis.to_string()),
            OpticsParam::Lens(p) => self.lens.get_param(p),
        }
    }

    pub fn set_param(&mut self, param: OpticsParam, value: ParamValue) -> Result<(), ParamError> {
        match param {
            OpticsParam::Name => {
                self.name = value
                    .as_text()
                    .ok_or_else(|| type_error("optics name", "text"))?
                    .to_string();
            }
            OpticsParam::Model => {
                let text = value
                    .as_text()
                    .ok_or_else(|| type_error("optics model", "text"))?;
                self.model = text.parse().map_err(|reason| ParamError::InvalidValue {
                    param: "optics model".to_string(),
                    reason,
                })?;
            }
            OpticsParam::FNumber => {
                let f_number = value
                    .as_scalar()
                    .ok_or_else(|| type_error("optics f-number", "scalar"))?;
                self.set_f_number(f_number)?;
            }
            OpticsParam::FocalLength(unit) => {
                let v = value
                    .as_scalar()
                    .ok_or_else(|| type_error("optics focal length", "scalar"))?;
                self.set_focal_length(Length::from_meters(v / unit.scale_from_meters()))?;
            }
            OpticsParam::OffAxis => {
                let text = value
                    .as_text()
                    .ok_or_else(|| type_error("optics off axis", "text"))?;
                self.off_axis = text.parse().map_err(|reason| ParamError::InvalidValue {
                    param: "optics off axis".to_string(),
                    reason,
                })?;
            }
            OpticsParam::Power => return Err(ParamError::ReadOnly("optics power".to_string())),
            OpticsParam::ApertureDiameter(_) => {
                return Err(ParamError::ReadOnly("optics aperture diameter".to_string()))
            }
            OpticsParam::NumericalAperture => {
                return Err(ParamError::ReadOnly("optics numerical aperture".to_string()))
            }
            OpticsParam::Lens(p) => self.lens.set_param(p, value)?,
        }
        Ok(())
    }
}

impl Default for Optics {
    fn default() -> Self {
        Self::new(WaveSamples::visible())
    }
}

fn positive(param: &str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamError::InvalidValue {
            param: param.to_string(),
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn type_error(param: &str, expected: &'static str) -> ParamError {
    ParamError::TypeError {
        param: param.to_string(),
        expected,
    }
}
