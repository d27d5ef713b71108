//! Parameter dispatch for optical images.
//!
//! [`OpticalImage::get_param`] and [`OpticalImage::set_param`] map each
//! [`OiParam`] onto the typed methods. [`OpticalImage::get`] and
//! [`OpticalImage::set`] are the string-named boundary on top of them.

use log::debug;
use ndarray::Array3;

use super::{OiError, OiParam, OpticalImage};
use crate::param::ParamValue;
use crate::radiometry::{Precision, RadiometryError};
use crate::scene::SceneGeometry;
use crate::spectral::WaveSamples;

fn type_error(param: &OiParam, expected: &'static str, value: &ParamValue) -> OiError {
    OiError::TypeError {
        param: param.label(),
        expected,
        actual: value.kind(),
    }
}

fn read_only(param: &OiParam) -> OiError {
    OiError::ReadOnly(param.label())
}

impl OpticalImage {
    /// Read a parameter by name.
    ///
    /// `unit` is an optional length token (`"mm"`, `"um"`, ...) applied to
    /// geometric parameters; it defaults to meters.
    pub fn get(&self, name: &str, unit: Option<&str>) -> Result<ParamValue, OiError> {
        self.get_param(&OiParam::parse(name, unit)?, None)
    }

    /// Read a parameter by name, falling back on `scene` for image size
    pub fn get_with_scene(
        &self,
        name: &str,
        unit: Option<&str>,
        scene: &dyn SceneGeometry,
    ) -> Result<ParamValue, OiError> {
        self.get_param(&OiParam::parse(name, unit)?, Some(scene))
    }

    /// Read photons or energy at the samples nearest `nm`
    pub fn get_wave_subset(&self, name: &str, nm: &[f64]) -> Result<ParamValue, OiError> {
        self.get_param(&OiParam::parse(name, None)?.with_wave(nm)?, None)
    }

    /// Write a parameter by name.
    ///
    /// A `None` value fails with [`OiError::MissingValue`].
    pub fn set(&mut self, name: &str, value: Option<ParamValue>) -> Result<(), OiError> {
        let param = OiParam::parse(name, None)?;
        let value = value.ok_or_else(|| OiError::MissingValue(name.to_string()))?;
        self.set_param(param, value)
    }

    /// Write a unit-scaled parameter by name; `value` is read in `unit`
    pub fn set_in_unit(
        &mut self,
        name: &str,
        unit: &str,
        value: Option<ParamValue>,
    ) -> Result<(), OiError> {
        let param = OiParam::parse(name, Some(unit))?;
        let value = value.ok_or_else(|| OiError::MissingValue(name.to_string()))?;
        self.set_param(param, value)
    }

    /// Write photon planes nearest the listed wavelengths
    pub fn set_wave_subset(
        &mut self,
        name: &str,
        nm: &[f64],
        value: Option<ParamValue>,
    ) -> Result<(), OiError> {
        let param = OiParam::parse(name, None)?.with_wave(nm)?;
        let value = value.ok_or_else(|| OiError::MissingValue(name.to_string()))?;
        self.set_param(param, value)
    }

    pub fn get_param(
        &self,
        param: &OiParam,
        scene: Option<&dyn SceneGeometry>,
    ) -> Result<ParamValue, OiError> {
        let value = match param {
            OiParam::Name => ParamValue::Text(self.name.clone()),
            OiParam::Type => ParamValue::Text(self.kind.clone()),

            OiParam::Wave => ParamValue::Vector(self.wave.as_slice().to_vec()),
            OiParam::BinWidth => ParamValue::Scalar(self.wave.bin_width()),
            OiParam::NWave => ParamValue::Scalar(self.wave.len() as f64),

            OiParam::Photons(None) => {
                let photons = self.photons().ok_or(RadiometryError::NoPhotonData)?;
                ParamValue::Cube(photons.clone())
            }
            OiParam::Photons(Some(nm)) => ParamValue::Cube(self.photons_at(nm)?),
            OiParam::Energy(None) => ParamValue::Cube(self.energy()?),
            OiParam::Energy(Some(nm)) => ParamValue::Cube(self.energy_at(nm)?),
            OiParam::Illuminance => ParamValue::Matrix(self.illuminance()?.clone()),
            OiParam::MeanIlluminance => ParamValue::Scalar(self.mean_illuminance()?),
            OiParam::Xyz => ParamValue::Cube(self.xyz()?),
            OiParam::PhotonMax => ParamValue::Scalar(self.photon_extreme(f64::max)?),
            OiParam::PhotonMin => ParamValue::Scalar(self.photon_extreme(f64::min)?),
            OiParam::BitDepth => ParamValue::Scalar(f64::from(self.precision().bit_depth())),
            OiParam::Compression => ParamValue::Flag(false),

            OiParam::Size => {
                let (rows, cols) = self.size(scene).ok_or(OiError::NoSpatialSize)?;
                ParamValue::Size(rows, cols)
            }
            OiParam::Rows => ParamValue::Scalar(self.rows(scene).ok_or(OiError::NoSpatialSize)? as f64),
            OiParam::Cols => ParamValue::Scalar(self.cols(scene).ok_or(OiError::NoSpatialSize)? as f64),
            OiParam::Distance(unit) => ParamValue::Scalar(self.distance(*unit)),
            OiParam::Hfov => ParamValue::Scalar(self.hfov()),
            OiParam::Vfov => ParamValue::Scalar(self.vfov(scene)?),
            OiParam::Width(unit) => ParamValue::Scalar(self.width(*unit)),
            OiParam::Height(unit) => ParamValue::Scalar(self.height(*unit, scene)?),
            OiParam::Area(unit) => ParamValue::Scalar(self.area(*unit, scene)?),
            OiParam::Diagonal(unit) => ParamValue::Scalar(self.diagonal(*unit, scene)?),
            OiParam::SampleSize(unit) => ParamValue::Scalar(self.sample_size(*unit, scene)?),
            OiParam::SampleSpacing(unit) | OiParam::SpatialResolution(unit) => {
                let (dy, dx) = self.sample_spacing(*unit, scene)?;
                ParamValue::Pair(dy, dx)
            }
            OiParam::AspectRatio => ParamValue::Scalar(self.aspect_ratio(scene)?),
            OiParam::AngularResolution => {
                let (dy, dx) = self.angular_resolution(scene)?;
                ParamValue::Pair(dy, dx)
            }
            OiParam::SpatialSupport(unit) => {
                let (xs, ys) = self.spatial_support(*unit, scene)?;
                ParamValue::Support(xs, ys)
            }
            OiParam::DepthMap => match self.depth_map() {
                Some(depth) => ParamValue::Matrix(depth.clone()),
                None => ParamValue::Flag(false),
            },

            OiParam::Diffuser => ParamValue::Diffuser(self.diffuser),
            OiParam::DiffuserMethod => ParamValue::Text(self.diffuser.method.to_string()),
            OiParam::DiffuserBlur(unit) => {
                ParamValue::Scalar(self.diffuser.blur_fwhm_m * unit.scale_from_meters())
            }
            OiParam::Psf => match self.psf() {
                Some(psf) => ParamValue::Psf(Box::new(psf.clone())),
                None => ParamValue::Flag(false),
            },

            OiParam::OpticsBlock => ParamValue::Optics(Box::new(self.optics.clone())),
            OiParam::Optics(p) => self.optics.get_param(*p),
        };
        Ok(value)
    }

    pub fn set_param(&mut self, param: OiParam, value: ParamValue) -> Result<(), OiError> {
        match &param {
            OiParam::Name => {
                let name = value.as_text().ok_or_else(|| type_error(&param, "text", &value))?;
                self.set_name(name);
            }
            OiParam::Wave => {
                let nm = value
                    .as_vector()
                    .ok_or_else(|| type_error(&param, "vector", &value))?;
                self.set_wave(WaveSamples::new(nm)?)?;
            }
            OiParam::Photons(subset) => self.set_photon_value(&param, subset.as_deref(), value)?,
            OiParam::Illuminance => match value {
                ParamValue::Matrix(lux) => self.set_illuminance(lux)?,
                other => return Err(type_error(&param, "matrix", &other)),
            },
            OiParam::MeanIlluminance => {
                let lux = value
                    .as_scalar()
                    .ok_or_else(|| type_error(&param, "scalar", &value))?;
                self.set_mean_illuminance(lux)?;
            }
            OiParam::BitDepth => {
                let bits = value
                    .as_scalar()
                    .ok_or_else(|| type_error(&param, "scalar", &value))?;
                let precision = if bits.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&bits) {
                    Precision::from_bit_depth(bits as u32)
                        .map_err(|_| OiError::UnsupportedPrecision(bits as u32))?
                } else {
                    return Err(OiError::InvalidValue {
                        param: param.label(),
                        reason: format!("bit depth must be a whole number, got {bits}"),
                    });
                };
                self.set_precision(precision);
            }
            OiParam::Compression => {
                debug!("Ignoring compression setting; photon data is never compressed");
            }
            OiParam::Distance(unit) => {
                let v = value
                    .as_scalar()
                    .ok_or_else(|| type_error(&param, "scalar", &value))?;
                self.set_distance(v / unit.scale_from_meters())?;
            }
            OiParam::Hfov => {
                let degrees = value
                    .as_scalar()
                    .ok_or_else(|| type_error(&param, "scalar", &value))?;
                self.set_hfov(degrees)?;
            }
            OiParam::DepthMap => match value {
                ParamValue::Matrix(depth) => self.set_depth_map(depth)?,
                other => return Err(type_error(&param, "matrix", &other)),
            },
            OiParam::Diffuser => match value {
                ParamValue::Diffuser(diffuser) => self.set_diffuser(diffuser)?,
                other => return Err(type_error(&param, "diffuser", &other)),
            },
            OiParam::DiffuserMethod => {
                let text = value.as_text().ok_or_else(|| type_error(&param, "text", &value))?;
                let method = text.parse().map_err(|reason| OiError::InvalidValue {
                    param: param.label(),
                    reason,
                })?;
                let diffuser = super::Diffuser {
                    method,
                    ..self.diffuser
                };
                self.set_diffuser(diffuser)?;
            }
            OiParam::DiffuserBlur(unit) => {
                let v = value
                    .as_scalar()
                    .ok_or_else(|| type_error(&param, "scalar", &value))?;
                let diffuser = super::Diffuser {
                    blur_fwhm_m: v / unit.scale_from_meters(),
                    ..self.diffuser
                };
                self.set_diffuser(diffuser)?;
            }
            OiParam::Psf => match value {
                ParamValue::Psf(psf) => self.set_psf(Some(*psf)),
                other => return Err(type_error(&param, "point spread function", &other)),
            },
            OiParam::OpticsBlock => match value {
                ParamValue::Optics(optics) => self.set_optics(*optics),
                other => return Err(type_error(&param, "optics", &other)),
            },
            OiParam::Optics(p) => self.optics.set_param(*p, value)?,

            OiParam::Type
            | OiParam::BinWidth
            | OiParam::NWave
            | OiParam::Energy(_)
            | OiParam::Xyz
            | OiParam::PhotonMax
            | OiParam::PhotonMin
            | OiParam::Size
            | OiParam::Rows
            | OiParam::Cols
            | OiParam::Vfov
            | OiParam::Width(_)
            | OiParam::Height(_)
            | OiParam::Area(_)
            | OiParam::Diagonal(_)
            | OiParam::SampleSize(_)
            | OiParam::SampleSpacing(_)
            | OiParam::SpatialResolution(_)
            | OiParam::AspectRatio
            | OiParam::AngularResolution
            | OiParam::SpatialSupport(_) => return Err(read_only(&param)),
        }
        Ok(())
    }

    fn set_photon_value(
        &mut self,
        param: &OiParam,
        subset: Option<&[f64]>,
        value: ParamValue,
    ) -> Result<(), OiError> {
        let cube: Array3<f64> = match (value, subset) {
            (ParamValue::Cube(cube), None) => return self.set_photons(cube),
            (ParamValue::SingleCube(cube), None) => return self.set_photons_f32(cube),
            (ParamValue::Cube(cube), Some(_)) => cube,
            (ParamValue::SingleCube(cube), Some(_)) => cube.mapv(f64::from),
            (other, _) => return Err(type_error(param, "floating point cube", &other)),
        };
        match subset {
            Some(nm) => self.set_photons_at(nm, &cube),
            None => self.set_photons(cube),
        }
    }

    fn photon_extreme(&self, pick: fn(f64, f64) -> f64) -> Result<f64, OiError> {
        let photons = self.photons().ok_or(RadiometryError::NoPhotonData)?;
        Ok(photons.iter().copied().reduce(pick).unwrap_or(0.0))
    }
}
