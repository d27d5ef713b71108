//! Closed parameter vocabulary for optical images.

use shared::units::LengthUnit;

use super::OiError;
use crate::optics::{LensParam, OpticsParam};
use crate::param::{normalize_name, strip_namespace};

/// Every parameter an optical image answers to.
///
/// Unit-scaled geometry carries the unit it will be reported or accepted
/// in. Photon and energy reads may be restricted to the samples nearest a
/// list of wavelengths.
#[derive(Debug, Clone, PartialEq)]
pub enum OiParam {
    Name,
    Type,

    // Spectral axis
    Wave,
    BinWidth,
    NWave,

    // Photon data and derived radiometry
    Photons(Option<Vec<f64>>),
    Energy(Option<Vec<f64>>),
    Illuminance,
    MeanIlluminance,
    Xyz,
    PhotonMax,
    PhotonMin,
    BitDepth,
    Compression,

    // Geometry
    Size,
    Rows,
    Cols,
    Distance(LengthUnit),
    Hfov,
    Vfov,
    Width(LengthUnit),
    Height(LengthUnit),
    Area(LengthUnit),
    Diagonal(LengthUnit),
    SampleSize(LengthUnit),
    SampleSpacing(LengthUnit),
    SpatialResolution(LengthUnit),
    AspectRatio,
    AngularResolution,
    SpatialSupport(LengthUnit),
    DepthMap,

    // Auxiliary state
    Diffuser,
    DiffuserMethod,
    DiffuserBlur(LengthUnit),
    Psf,

    /// The whole optics block
    OpticsBlock,
    /// A parameter of the optics block or its lens
    Optics(OpticsParam),
}

impl OiParam {
    /// Resolve a parameter name with an optional unit token.
    ///
    /// Names are matched after [`normalize_name`]. Names in the `optics`
    /// or `lens` namespace are forwarded to the optics vocabulary before
    /// anything else is tried.
    pub fn parse(name: &str, unit: Option<&str>) -> Result<Self, OiError> {
        let unit = match unit {
            Some(token) => token.parse::<LengthUnit>()?,
            None => LengthUnit::Meters,
        };
        let key = normalize_name(name);

        if key == "optics" {
            return Ok(OiParam::OpticsBlock);
        }
        if let Some(rest) = strip_namespace(&key, "optics") {
            return Ok(OiParam::Optics(OpticsParam::parse(rest, unit)?));
        }
        if let Some(rest) = strip_namespace(&key, "lens") {
            return Ok(OiParam::Optics(OpticsParam::Lens(LensParam::parse(rest)?)));
        }

        let param = match key.as_str() {
            "name" => OiParam::Name,
            "type" => OiParam::Type,

            "wave" | "wavelength" => OiParam::Wave,
            "binwidth" | "wavelengthspacing" => OiParam::BinWidth,
            "nwave" | "nwaves" => OiParam::NWave,

            "photons" => OiParam::Photons(None),
            "energy" => OiParam::Energy(None),
            "illuminance" | "lux" => OiParam::Illuminance,
            "meanilluminance" | "meanlux" => OiParam::MeanIlluminance,
            "xyz" => OiParam::Xyz,
            "datamax" | "photonmax" => OiParam::PhotonMax,
            "datamin" | "photonmin" => OiParam::PhotonMin,
            "bitdepth" => OiParam::BitDepth,
            "compression" => OiParam::Compression,

            "size" => OiParam::Size,
            "rows" | "row" => OiParam::Rows,
            "cols" | "col" | "columns" => OiParam::Cols,
            "distance" | "focalplanedistance" | "imagedistance" => OiParam::Distance(unit),
            "hfov" | "fov" | "horizontalfieldofview" | "wangular" => OiParam::Hfov,
            "vfov" | "verticalfieldofview" | "hangular" => OiParam::Vfov,
            "width" => OiParam::Width(unit),
            "height" => OiParam::Height(unit),
            "area" => OiParam::Area(unit),
            "diagonal" | "diagonalsize" => OiParam::Diagonal(unit),
            "samplesize" => OiParam::SampleSize(unit),
            "samplespacing" => OiParam::SampleSpacing(unit),
            "spatialresolution" | "distancepersample" => OiParam::SpatialResolution(unit),
            "aspectratio" => OiParam::AspectRatio,
            "angularresolution" | "degreespersample" => OiParam::AngularResolution,
            "spatialsupport" => OiParam::SpatialSupport(unit),
            "depthmap" => OiParam::DepthMap,

            "diffuser" => OiParam::Diffuser,
            "diffusermethod" => OiParam::DiffuserMethod,
            "diffuserblur" => OiParam::DiffuserBlur(unit),
            "psf" | "psfstruct" | "shiftvariantpsf" => OiParam::Psf,

            _ => return Err(OiError::UnknownParameter(name.to_string())),
        };
        Ok(param)
    }

    /// Restrict a photon or energy parameter to the listed wavelengths
    pub fn with_wave(self, nm: &[f64]) -> Result<Self, OiError> {
        match self {
            OiParam::Photons(_) => Ok(OiParam::Photons(Some(nm.to_vec()))),
            OiParam::Energy(_) => Ok(OiParam::Energy(Some(nm.to_vec()))),
            other => Err(OiError::InvalidValue {
                param: other.label(),
                reason: "only photons and energy accept a wavelength subset".to_string(),
            }),
        }
    }

    /// Name used in error messages
    pub fn label(&self) -> String {
        match self {
            OiParam::Optics(p) => format!("optics {p:?}").to_lowercase(),
            other => {
                let debug = format!("{other:?}");
                let head = debug.split('(').next().unwrap_or(&debug);
                head.to_lowercase()
            }
        }
    }
}
