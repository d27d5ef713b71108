//! Photon cube with memoized photometric quantities.
//!
//! The cube is indexed `(row, col, wave)` and holds photon rates in
//! photons·s⁻¹·m⁻²·nm⁻¹. Everything photometric is derived from it.
//!
//! # Derived Quantities
//!
//! - **Energy**: each wavelength plane times `h·c/λ`, in W·m⁻²·nm⁻¹
//! - **Illuminance**: `683 · Δλ · Σ E(λ)·V(λ)` per pixel, in lux, where
//!   `V` is the photopic luminosity function and `Δλ` the bin width
//! - **Mean illuminance**: the mean of the illuminance map
//! - **XYZ**: energy weighted by the CIE colour matching functions
//!
//! # Caching
//!
//! Illuminance and its mean sit in explicit [`Memoized`] cells. They are
//! computed on first read and dropped by [`PhotonCube::invalidate`], which
//! every photon write calls. Setting the illuminance directly pins the
//! cached map without touching photons and drops only the cached mean.
//!
//! # Value Rules
//!
//! Stored photons are finite and non-negative; writes that break this are
//! rejected before anything changes. Under [`Precision::Single`] every
//! stored value is rounded through `f32`, matching a 32-bit cube.
//!
//! # Example
//!
//! ```
//! use ndarray::Array3;
//! use oisim::{PhotonCube, WaveSamples};
//!
//! let wave = WaveSamples::visible();
//! let mut cube = PhotonCube::default();
//! cube.set_photons(Array3::from_elem((2, 2, wave.len()), 1e15), &wave).unwrap();
//! let lux = cube.mean_illuminance(&wave).unwrap();
//! cube.set_mean_illuminance(&wave, 2.0 * lux).unwrap();
//! assert!((cube.photons().unwrap()[[0, 0, 0]] - 2e15).abs() < 1e3);
//! ```

use log::debug;
use ndarray::{Array2, Array3, Axis};
use thiserror::Error;

use super::memo::Memoized;
use crate::photometry::{illuminance_from_energy, quanta_to_energy, xyz_from_energy};
use crate::spectral::WaveSamples;

/// Errors raised by photon cube operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RadiometryError {
    #[error("No photon data present")]
    NoPhotonData,

    #[error("Photon values must be finite and non-negative, found {0}")]
    InvalidPhotonValue(f64),

    #[error("Photon cube has {cube} wavelength planes but the axis has {wave} samples")]
    WaveCountMismatch { cube: usize, wave: usize },

    #[error("Expected spatial shape {expected:?}, got {actual:?}")]
    SpatialShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid region of interest: {0}")]
    InvalidRegion(String),

    #[error("Mean illuminance is zero; photons cannot be rescaled to {target} lux")]
    ZeroIlluminance { target: f64 },

    #[error("Target illuminance must be finite and non-negative, got {0}")]
    InvalidIlluminance(f64),

    #[error("Unsupported bit depth {0}; only 32 (single) and 64 (double) are supported")]
    UnsupportedPrecision(u32),

    #[error("Invalid exposure parameters: {0}")]
    InvalidExposure(String),
}

/// Floating point precision of the stored photon data.
///
/// Data is held as `f64`; single precision values are rounded through
/// `f32` on every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    Single,
    #[default]
    Double,
}

impl Precision {
    /// Legacy bit depth for this precision
    pub fn bit_depth(self) -> u32 {
        match self {
            Precision::Single => 32,
            Precision::Double => 64,
        }
    }

    /// Precision for a legacy bit depth value
    pub fn from_bit_depth(bits: u32) -> Result<Self, RadiometryError> {
        match bits {
            32 => Ok(Precision::Single),
            64 => Ok(Precision::Double),
            other => Err(RadiometryError::UnsupportedPrecision(other)),
        }
    }

    fn quantize(self, value: f64) -> f64 {
        match self {
            Precision::Single => value as f32 as f64,
            Precision::Double => value,
        }
    }
}

/// Check every value is finite and non-negative.
fn validate_photons<'a, I: IntoIterator<Item = &'a f64>>(values: I) -> Result<(), RadiometryError> {
    match values.into_iter().find(|v| !v.is_finite() || **v < 0.0) {
        Some(&bad) => Err(RadiometryError::InvalidPhotonValue(bad)),
        None => Ok(()),
    }
}

/// The (row, col, wave) photon array plus its derived-quantity cache
#[derive(Debug, Clone, Default)]
pub struct PhotonCube {
    photons: Option<Array3<f64>>,
    precision: Precision,
    illuminance: Memoized<Array2<f64>>,
    mean_illuminance: Memoized<f64>,
}

impl PhotonCube {
    /// An empty cube with the given precision
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            ..Self::default()
        }
    }

    /// True when no photon data has been written
    pub fn is_empty(&self) -> bool {
        self.photons.is_none()
    }

    /// `(rows, cols, n_wave)` when data is present
    pub fn dim(&self) -> Option<(usize, usize, usize)> {
        self.photons.as_ref().map(|p| p.dim())
    }

    /// `(rows, cols)` when data is present
    pub fn spatial_size(&self) -> Option<(usize, usize)> {
        self.dim().map(|(r, c, _)| (r, c))
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Change the storage precision, re-rounding any existing data.
    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
        if let Some(photons) = self.photons.as_mut() {
            photons.mapv_inplace(|v| precision.quantize(v));
            self.invalidate();
        }
    }

    /// Drop the cached illuminance and mean illuminance
    pub fn invalidate(&mut self) {
        self.illuminance.invalidate();
        self.mean_illuminance.invalidate();
    }

    /// True when an illuminance map is currently cached
    pub fn has_cached_illuminance(&self) -> bool {
        self.illuminance.is_set()
    }

    /// Full photon cube
    pub fn photons(&self) -> Option<&Array3<f64>> {
        self.photons.as_ref()
    }

    fn require_photons(&self) -> Result<&Array3<f64>, RadiometryError> {
        self.photons.as_ref().ok_or(RadiometryError::NoPhotonData)
    }

    /// Sub-cube at the samples nearest each requested wavelength.
    pub fn photons_at(&self, wave: &WaveSamples, nm: &[f64]) -> Result<Array3<f64>, RadiometryError> {
        let photons = self.require_photons()?;
        Ok(photons.select(Axis(2), &wave.nearest_indices(nm)))
    }

    /// Replace the whole cube.
    ///
    /// The spatial size may change here; this is the only place it can.
    pub fn set_photons(
        &mut self,
        mut data: Array3<f64>,
        wave: &WaveSamples,
    ) -> Result<(), RadiometryError> {
        let (_, _, n_wave) = data.dim();
        if n_wave != wave.len() {
            return Err(RadiometryError::WaveCountMismatch {
                cube: n_wave,
                wave: wave.len(),
            });
        }
        validate_photons(data.iter())?;

        let precision = self.precision;
        if precision == Precision::Single {
            data.mapv_inplace(|v| precision.quantize(v));
        }
        self.photons = Some(data);
        self.invalidate();
        Ok(())
    }

    /// Replace the whole cube with single precision data.
    ///
    /// Storage precision switches to [`Precision::Single`].
    pub fn set_photons_f32(
        &mut self,
        data: Array3<f32>,
        wave: &WaveSamples,
    ) -> Result<(), RadiometryError> {
        self.precision = Precision::Single;
        self.set_photons(data.mapv(f64::from), wave)
    }

    /// Overwrite only the planes nearest the requested wavelengths.
    ///
    /// `planes` must be `(rows, cols, nm.len())` and match the existing
    /// spatial size.
    pub fn set_photon_planes(
        &mut self,
        wave: &WaveSamples,
        nm: &[f64],
        planes: &Array3<f64>,
    ) -> Result<(), RadiometryError> {
        let precision = self.precision;
        let photons = self.photons.as_mut().ok_or(RadiometryError::NoPhotonData)?;
        let (rows, cols, _) = photons.dim();
        let (p_rows, p_cols, p_wave) = planes.dim();
        if (p_rows, p_cols) != (rows, cols) {
            return Err(RadiometryError::SpatialShapeMismatch {
                expected: (rows, cols),
                actual: (p_rows, p_cols),
            });
        }
        if p_wave != nm.len() {
            return Err(RadiometryError::WaveCountMismatch {
                cube: p_wave,
                wave: nm.len(),
            });
        }
        validate_photons(planes.iter())?;

        for (plane, idx) in planes.axis_iter(Axis(2)).zip(wave.nearest_indices(nm)) {
            photons
                .index_axis_mut(Axis(2), idx)
                .zip_mut_with(&plane, |dst, &src| *dst = precision.quantize(src));
        }
        self.invalidate();
        Ok(())
    }

    /// Remove all photon data
    pub fn clear(&mut self) {
        self.photons = None;
        self.invalidate();
    }

    /// Multiply every photon value by `factor`
    pub fn scale(&mut self, factor: f64) -> Result<(), RadiometryError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(RadiometryError::InvalidPhotonValue(factor));
        }
        let precision = self.precision;
        let photons = self.photons.as_mut().ok_or(RadiometryError::NoPhotonData)?;
        photons.mapv_inplace(|v| precision.quantize(v * factor));
        self.invalidate();
        Ok(())
    }

    /// Spectral irradiance cube in W·m⁻²·nm⁻¹
    pub fn energy(&self, wave: &WaveSamples) -> Result<Array3<f64>, RadiometryError> {
        Ok(quanta_to_energy(self.require_photons()?, wave))
    }

    /// Energy sub-cube at the samples nearest each requested wavelength
    pub fn energy_at(&self, wave: &WaveSamples, nm: &[f64]) -> Result<Array3<f64>, RadiometryError> {
        Ok(self.energy(wave)?.select(Axis(2), &wave.nearest_indices(nm)))
    }

    /// Illuminance map in lux, computed on first use.
    pub fn illuminance(&self, wave: &WaveSamples) -> Result<&Array2<f64>, RadiometryError> {
        self.illuminance.get_or_try_compute(|| -> Result<_, RadiometryError> {
            let energy = self.energy(wave)?;
            debug!("Computing illuminance for {:?} photon cube", energy.dim());
            Ok(illuminance_from_energy(&energy, wave))
        })
    }

    /// Store an illuminance map directly.
    ///
    /// The map must match the spatial size of the photon data. The cached
    /// mean is reset so it follows the new map.
    pub fn set_illuminance(&mut self, lux: Array2<f64>) -> Result<(), RadiometryError> {
        let expected = self
            .spatial_size()
            .ok_or(RadiometryError::NoPhotonData)?;
        if lux.dim() != expected {
            return Err(RadiometryError::SpatialShapeMismatch {
                expected,
                actual: lux.dim(),
            });
        }
        self.illuminance.set(lux);
        self.mean_illuminance.invalidate();
        Ok(())
    }

    /// Mean of the illuminance map
    pub fn mean_illuminance(&self, wave: &WaveSamples) -> Result<f64, RadiometryError> {
        self.mean_illuminance
            .get_or_try_compute(|| -> Result<_, RadiometryError> {
                Ok(self.illuminance(wave)?.mean().unwrap_or(0.0))
            })
            .copied()
    }

    /// Rescale all photons uniformly so the mean illuminance equals `target_lux`.
    pub fn set_mean_illuminance(
        &mut self,
        wave: &WaveSamples,
        target_lux: f64,
    ) -> Result<(), RadiometryError> {
        if !target_lux.is_finite() || target_lux < 0.0 {
            return Err(RadiometryError::InvalidIlluminance(target_lux));
        }
        let current = self.mean_illuminance(wave)?;
        if current <= 0.0 {
            return Err(RadiometryError::ZeroIlluminance { target: target_lux });
        }

        self.scale(target_lux / current)?;
        self.illuminance(wave)?;
        Ok(())
    }

    /// CIE XYZ image, shape (rows, cols, 3)
    pub fn xyz(&self, wave: &WaveSamples) -> Result<Array3<f64>, RadiometryError> {
        Ok(xyz_from_energy(&self.energy(wave)?, wave))
    }
}

/// Cubes compare by stored data; cache state is ignored
impl PartialEq for PhotonCube {
    fn eq(&self, other: &Self) -> bool {
        self.precision == other.precision && self.photons == other.photons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn filled(value: f64) -> (PhotonCube, WaveSamples) {
        let wave = WaveSamples::visible();
        let mut cube = PhotonCube::new(Precision::Double);
        cube.set_photons(Array3::from_elem((4, 5, wave.len()), value), &wave)
            .unwrap();
        (cube, wave)
    }

    #[test]
    fn test_set_photons_checks_wave_count() {
        let wave = WaveSamples::visible();
        let mut cube = PhotonCube::default();
        let err = cube
            .set_photons(Array3::zeros((2, 2, 3)), &wave)
            .unwrap_err();
        assert_eq!(err, RadiometryError::WaveCountMismatch { cube: 3, wave: 31 });
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let wave = WaveSamples::monochromatic(550.0).unwrap();
        let mut cube = PhotonCube::default();
        let mut data = Array3::from_elem((2, 2, 1), 1.0);
        data[[1, 1, 0]] = -2.0;
        assert_eq!(
            cube.set_photons(data, &wave),
            Err(RadiometryError::InvalidPhotonValue(-2.0))
        );
        let mut data = Array3::from_elem((2, 2, 1), 1.0);
        data[[0, 1, 0]] = f64::NAN;
        assert!(cube.set_photons(data, &wave).is_err());
        assert!(cube.is_empty());
    }

    #[test]
    fn test_photon_write_invalidates_cache() {
        let (mut cube, wave) = filled(1e15);
        let first = cube.illuminance(&wave).unwrap().clone();
        assert!(cube.has_cached_illuminance());

        cube.set_photons(Array3::from_elem((4, 5, wave.len()), 2e15), &wave)
            .unwrap();
        assert!(!cube.has_cached_illuminance());
        let second = cube.illuminance(&wave).unwrap();
        assert_relative_eq!(second[[0, 0]], 2.0 * first[[0, 0]], max_relative = 1e-12);
    }

    #[test]
    fn test_wave_subset_uses_nearest_sample() {
        let wave = WaveSamples::visible();
        let mut data = Array3::zeros((2, 2, wave.len()));
        for (k, mut plane) in data.axis_iter_mut(Axis(2)).enumerate() {
            plane.fill(k as f64);
        }
        let mut cube = PhotonCube::default();
        cube.set_photons(data, &wave).unwrap();

        let sub = cube.photons_at(&wave, &[552.0, 401.0]).unwrap();
        assert_eq!(sub.dim(), (2, 2, 2));
        assert_eq!(sub[[0, 0, 0]], 15.0);
        assert_eq!(sub[[1, 1, 1]], 0.0);
    }

    #[test]
    fn test_set_photon_planes() {
        let (mut cube, wave) = filled(1.0);
        let planes = Array3::from_elem((4, 5, 1), 9.0);
        cube.set_photon_planes(&wave, &[600.0], &planes).unwrap();

        let photons = cube.photons().unwrap();
        assert_eq!(photons[[3, 4, 20]], 9.0);
        assert_eq!(photons[[3, 4, 19]], 1.0);

        let wrong = Array3::from_elem((3, 5, 1), 9.0);
        assert!(matches!(
            cube.set_photon_planes(&wave, &[600.0], &wrong),
            Err(RadiometryError::SpatialShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_set_mean_illuminance_rescales_uniformly() {
        let (mut cube, wave) = filled(1e16);
        let before = cube.photons().unwrap()[[0, 0, 0]];
        let mean = cube.mean_illuminance(&wave).unwrap();

        cube.set_mean_illuminance(&wave, mean * 3.0).unwrap();
        assert_relative_eq!(cube.mean_illuminance(&wave).unwrap(), mean * 3.0, max_relative = 1e-12);
        assert_relative_eq!(cube.photons().unwrap()[[0, 0, 0]], before * 3.0, max_relative = 1e-12);
        assert!(cube.has_cached_illuminance());
    }

    #[test]
    fn test_set_mean_illuminance_on_dark_cube_fails() {
        let (mut cube, wave) = filled(0.0);
        assert_eq!(
            cube.set_mean_illuminance(&wave, 10.0),
            Err(RadiometryError::ZeroIlluminance { target: 10.0 })
        );
    }

    #[test]
    fn test_set_illuminance_shape_checked() {
        let (mut cube, _wave) = filled(1.0);
        assert!(cube.set_illuminance(Array2::zeros((4, 5))).is_ok());
        assert!(cube.set_illuminance(Array2::zeros((5, 4))).is_err());
    }

    #[test]
    fn test_single_precision_rounds() {
        let wave = WaveSamples::monochromatic(550.0).unwrap();
        let mut cube = PhotonCube::new(Precision::Single);
        let value = 1.0 + 1e-12;
        cube.set_photons(Array3::from_elem((1, 1, 1), value), &wave)
            .unwrap();
        assert_eq!(cube.photons().unwrap()[[0, 0, 0]], 1.0);
        assert_eq!(cube.precision().bit_depth(), 32);
    }

    #[test]
    fn test_bit_depth_parse() {
        assert_eq!(Precision::from_bit_depth(32), Ok(Precision::Single));
        assert_eq!(Precision::from_bit_depth(64), Ok(Precision::Double));
        assert_eq!(
            Precision::from_bit_depth(16),
            Err(RadiometryError::UnsupportedPrecision(16))
        );
    }

    #[test]
    fn test_empty_cube_queries_fail() {
        let cube = PhotonCube::default();
        let wave = WaveSamples::visible();
        assert_eq!(cube.illuminance(&wave), Err(RadiometryError::NoPhotonData));
        assert_eq!(cube.energy(&wave), Err(RadiometryError::NoPhotonData));
        assert!(cube.dim().is_none());
    }
}
