//! The optical image aggregate.
//!
//! An [`OpticalImage`] owns its wavelength axis and photon cube outright and
//! keeps the two consistent: the cube, when present, always has exactly one
//! plane per wavelength sample. Changing the axis resamples or zero-fills
//! the photons and restores the previous mean illuminance.

use log::{debug, warn};
use ndarray::{Array2, Array3};
use shared::units::LengthExt;

use super::components::{Diffuser, ShiftVariantPsf};
use super::OiError;
use crate::algo::interpolate_cube;
use crate::optics::Optics;
use crate::radiometry::{PhotonCube, Precision};
use crate::spectral::{WaveChange, WaveSamples};

/// Outcome of [`OpticalImage::set_wave`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveUpdate {
    /// New axis equal to the current one; nothing changed
    Unchanged,
    /// Axis replaced on an image with no photon data
    AxisOnly,
    /// Photons linearly resampled onto the new axis
    Interpolated,
    /// New axis extends past the old range; photons replaced by zeros
    ZeroFilled,
}

/// Spectral irradiance image at the sensor plane
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalImage {
    pub(crate) name: String,
    pub(crate) kind: String,
    pub(crate) wave: WaveSamples,
    pub(crate) cube: PhotonCube,
    pub(crate) optics: Optics,
    /// Distance from the lens to the image plane, meters
    pub(crate) distance_m: f64,
    /// Horizontal field of view, degrees
    pub(crate) hfov_deg: f64,
    pub(crate) diffuser: Diffuser,
    pub(crate) psf: Option<ShiftVariantPsf>,
    /// Per-pixel depth in meters
    pub(crate) depth_map: Option<Array2<f64>>,
}

impl OpticalImage {
    /// Type tag carried by every optical image
    pub const KIND: &'static str = "opticalimage";

    /// Default horizontal field of view, degrees
    pub const DEFAULT_HFOV_DEG: f64 = 10.0;

    /// Empty optical image on `wave` with default optics.
    ///
    /// The image plane sits at the optics focal length.
    pub fn new(wave: WaveSamples) -> Self {
        let optics = Optics::new(wave.clone());
        let distance_m = optics.focal_length().as_meters();
        Self {
            name: "oi".to_string(),
            kind: Self::KIND.to_string(),
            wave,
            cube: PhotonCube::default(),
            optics,
            distance_m,
            hfov_deg: Self::DEFAULT_HFOV_DEG,
            diffuser: Diffuser::default(),
            psf: None,
            depth_map: None,
        }
    }

    /// Optical image of `rows x cols` with every photon value set to `value`
    pub fn uniform(
        wave: WaveSamples,
        rows: usize,
        cols: usize,
        value: f64,
    ) -> Result<Self, OiError> {
        let mut oi = Self::new(wave);
        let photons = Array3::from_elem((rows, cols, oi.wave.len()), value);
        oi.set_photons(photons)?;
        Ok(oi)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn wave(&self) -> &WaveSamples {
        &self.wave
    }

    /// Photon cube and its cached derived values
    pub fn cube(&self) -> &PhotonCube {
        &self.cube
    }

    pub fn photons(&self) -> Option<&Array3<f64>> {
        self.cube.photons()
    }

    pub fn has_photons(&self) -> bool {
        !self.cube.is_empty()
    }

    /// Replace the photon cube; invalidates illuminance
    pub fn set_photons(&mut self, photons: Array3<f64>) -> Result<(), OiError> {
        self.cube.set_photons(photons, &self.wave)?;
        Ok(())
    }

    /// Replace the photon cube with single precision data
    pub fn set_photons_f32(&mut self, photons: Array3<f32>) -> Result<(), OiError> {
        self.cube.set_photons_f32(photons, &self.wave)?;
        Ok(())
    }

    /// Overwrite the planes nearest the listed wavelengths
    pub fn set_photons_at(&mut self, nm: &[f64], planes: &Array3<f64>) -> Result<(), OiError> {
        self.cube.set_photon_planes(&self.wave, nm, planes)?;
        Ok(())
    }

    /// Planes nearest the listed wavelengths
    pub fn photons_at(&self, nm: &[f64]) -> Result<Array3<f64>, OiError> {
        Ok(self.cube.photons_at(&self.wave, nm)?)
    }

    pub fn clear_photons(&mut self) {
        self.cube.clear();
    }

    pub fn energy(&self) -> Result<Array3<f64>, OiError> {
        Ok(self.cube.energy(&self.wave)?)
    }

    pub fn energy_at(&self, nm: &[f64]) -> Result<Array3<f64>, OiError> {
        Ok(self.cube.energy_at(&self.wave, nm)?)
    }

    pub fn illuminance(&self) -> Result<&Array2<f64>, OiError> {
        Ok(self.cube.illuminance(&self.wave)?)
    }

    pub fn set_illuminance(&mut self, lux: Array2<f64>) -> Result<(), OiError> {
        self.cube.set_illuminance(lux)?;
        Ok(())
    }

    pub fn mean_illuminance(&self) -> Result<f64, OiError> {
        Ok(self.cube.mean_illuminance(&self.wave)?)
    }

    /// Uniformly rescale photons to reach `target_lux` mean illuminance
    pub fn set_mean_illuminance(&mut self, target_lux: f64) -> Result<(), OiError> {
        self.cube.set_mean_illuminance(&self.wave, target_lux)?;
        Ok(())
    }

    pub fn xyz(&self) -> Result<Array3<f64>, OiError> {
        Ok(self.cube.xyz(&self.wave)?)
    }

    pub fn precision(&self) -> Precision {
        self.cube.precision()
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.cube.set_precision(precision);
    }

    /// Replace the wavelength axis and reconcile the photon data.
    ///
    /// When the old axis covers the new one the photons are interpolated
    /// and the mean illuminance from before the change is restored. A new
    /// axis reaching past the old range is never extrapolated; the photons
    /// become zeros at the new wavelength count. The lens working grid
    /// follows the new axis in every case except [`WaveUpdate::Unchanged`].
    pub fn set_wave(&mut self, wave: WaveSamples) -> Result<WaveUpdate, OiError> {
        if self.wave == wave {
            return Ok(WaveUpdate::Unchanged);
        }

        let preserved_lux = if self.has_photons() {
            Some(self.mean_illuminance()?)
        } else {
            None
        };

        let previous = match self.wave.replace(wave) {
            WaveChange::Unchanged => return Ok(WaveUpdate::Unchanged),
            WaveChange::Replaced { previous } => previous,
        };
        self.optics.set_wave(self.wave.clone());

        let photons = match self.cube.photons() {
            Some(photons) => photons,
            None => return Ok(WaveUpdate::AxisOnly),
        };
        let (rows, cols, _) = photons.dim();

        if !previous.covers(&self.wave) {
            warn!(
                "Wavelength range {}-{}nm extends beyond {}-{}nm; photon data replaced with zeros",
                self.wave.min_nm(),
                self.wave.max_nm(),
                previous.min_nm(),
                previous.max_nm()
            );
            self.set_photons(Array3::zeros((rows, cols, self.wave.len())))?;
            return Ok(WaveUpdate::ZeroFilled);
        }

        debug!(
            "Interpolating {}x{} photon cube from {} to {} wavelength samples",
            rows,
            cols,
            previous.len(),
            self.wave.len()
        );
        let resampled = interpolate_cube(&previous, &self.wave, photons)?;
        self.set_photons(resampled)?;

        let recomputed = self.illuminance()?.clone();
        self.set_illuminance(recomputed)?;
        if let Some(target) = preserved_lux {
            let current = self.mean_illuminance()?;
            if target > 0.0 && current > 0.0 {
                self.set_mean_illuminance(target)?;
            } else if target > 0.0 {
                warn!(
                    "Resampled photons carry no luminance; mean illuminance of {:.4} lux not restored",
                    target
                );
            }
        }
        Ok(WaveUpdate::Interpolated)
    }

    /// Copy of this image resampled onto `wave`
    pub fn resampled_to(&self, wave: WaveSamples) -> Result<Self, OiError> {
        let mut out = self.clone();
        out.set_wave(wave)?;
        Ok(out)
    }

    pub fn optics(&self) -> &Optics {
        &self.optics
    }

    pub fn optics_mut(&mut self) -> &mut Optics {
        &mut self.optics
    }

    /// Replace the optics block; its lens is moved onto this image's axis
    pub fn set_optics(&mut self, mut optics: Optics) {
        optics.set_wave(self.wave.clone());
        self.optics = optics;
    }

    pub fn diffuser(&self) -> &Diffuser {
        &self.diffuser
    }

    pub fn set_diffuser(&mut self, diffuser: Diffuser) -> Result<(), OiError> {
        if !diffuser.blur_fwhm_m.is_finite() || diffuser.blur_fwhm_m < 0.0 {
            return Err(OiError::InvalidValue {
                param: "diffuser blur".to_string(),
                reason: format!("must be non-negative, got {}", diffuser.blur_fwhm_m),
            });
        }
        self.diffuser = diffuser;
        Ok(())
    }

    pub fn psf(&self) -> Option<&ShiftVariantPsf> {
        self.psf.as_ref()
    }

    pub fn set_psf(&mut self, psf: Option<ShiftVariantPsf>) {
        self.psf = psf;
    }

    pub fn depth_map(&self) -> Option<&Array2<f64>> {
        self.depth_map.as_ref()
    }

    /// Store a depth map; it must match the photon data's spatial size
    pub fn set_depth_map(&mut self, depth: Array2<f64>) -> Result<(), OiError> {
        if let Some(size) = self.cube.spatial_size() {
            if depth.dim() != size {
                return Err(OiError::InvalidValue {
                    param: "depth map".to_string(),
                    reason: format!("expected shape {:?}, got {:?}", size, depth.dim()),
                });
            }
        }
        if depth.iter().any(|d| d.is_nan() || *d < 0.0) {
            return Err(OiError::InvalidValue {
                param: "depth map".to_string(),
                reason: "depths must be non-negative".to_string(),
            });
        }
        self.depth_map = Some(depth);
        Ok(())
    }
}

impl Default for OpticalImage {
    fn default() -> Self {
        Self::new(WaveSamples::visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp_oi() -> OpticalImage {
        let wave = WaveSamples::visible();
        let photons = Array3::from_shape_fn((4, 6, wave.len()), |(r, c, k)| {
            1e15 * (1.0 + r as f64 + 0.5 * c as f64) * (1.0 + 0.02 * k as f64)
        });
        let mut oi = OpticalImage::new(wave);
        oi.set_photons(photons).unwrap();
        oi
    }

    #[test]
    fn test_identical_wave_is_noop() {
        let mut oi = ramp_oi();
        let before = oi.photons().unwrap().clone();
        oi.illuminance().unwrap();

        let update = oi.set_wave(WaveSamples::visible()).unwrap();
        assert_eq!(update, WaveUpdate::Unchanged);
        assert_eq!(oi.photons().unwrap(), &before);
        assert!(oi.cube().has_cached_illuminance());
    }

    #[test]
    fn test_sub_range_preserves_mean_illuminance() {
        let mut oi = ramp_oi();
        let before = oi.mean_illuminance().unwrap();

        let update = oi
            .set_wave(WaveSamples::uniform(450.0, 650.0, 5.0).unwrap())
            .unwrap();
        assert_eq!(update, WaveUpdate::Interpolated);
        assert_eq!(oi.photons().unwrap().dim(), (4, 6, 41));
        assert_relative_eq!(oi.mean_illuminance().unwrap(), before, max_relative = 1e-9);
        assert_eq!(oi.optics().lens().wave(), oi.wave());
    }

    #[test]
    fn test_extended_range_zero_fills() {
        let mut oi = ramp_oi();
        let update = oi
            .set_wave(WaveSamples::uniform(380.0, 720.0, 10.0).unwrap())
            .unwrap();
        assert_eq!(update, WaveUpdate::ZeroFilled);
        let photons = oi.photons().unwrap();
        assert_eq!(photons.dim(), (4, 6, 35));
        assert!(photons.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_wave_change_without_photons() {
        let mut oi = OpticalImage::default();
        let wave = WaveSamples::monochromatic(550.0).unwrap();
        assert_eq!(oi.set_wave(wave.clone()).unwrap(), WaveUpdate::AxisOnly);
        assert_eq!(oi.wave(), &wave);
        assert!(!oi.has_photons());
    }

    #[test]
    fn test_photon_shape_follows_axis() {
        let mut oi = OpticalImage::default();
        assert!(oi.set_photons(Array3::zeros((2, 2, 5))).is_err());
        assert!(oi.set_photons(Array3::zeros((2, 2, 31))).is_ok());
    }

    #[test]
    fn test_depth_map_shape_checked() {
        let mut oi = ramp_oi();
        assert!(oi.set_depth_map(Array2::from_elem((4, 6), 1.5)).is_ok());
        assert!(oi.set_depth_map(Array2::from_elem((6, 4), 1.5)).is_err());
        assert!(oi.set_depth_map(Array2::from_elem((4, 6), -1.0)).is_err());
    }

    #[test]
    fn test_resampled_copy_leaves_source() {
        let oi = ramp_oi();
        let copy = oi
            .resampled_to(WaveSamples::uniform(500.0, 600.0, 50.0).unwrap())
            .unwrap();
        assert_eq!(copy.wave().len(), 3);
        assert_eq!(oi.wave().len(), 31);
    }
}
