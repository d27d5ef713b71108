//! Photon shot noise on a photon cube.
//!
//! The stored cube holds photon rates per unit area. Multiplying by the
//! integration time and the collecting area of one pixel gives the expected
//! count per element, which is then replaced by a Poisson draw.

use std::time::Duration;

use log::debug;
use ndarray::Array3;
use shared::image_proc::apply_poisson_photon_noise;

use super::photon_cube::{PhotonCube, RadiometryError};

/// Exposure used to turn a photon rate into a photon count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exposure {
    /// Integration time
    pub integration: Duration,
    /// Collecting area of a single pixel in m²
    pub pixel_area_m2: f64,
}

impl Exposure {
    pub fn new(integration: Duration, pixel_area_m2: f64) -> Self {
        Self {
            integration,
            pixel_area_m2,
        }
    }

    /// Factor converting photons·s⁻¹·m⁻² into photons
    pub fn count_scale(&self) -> Result<f64, RadiometryError> {
        if self.integration.is_zero() {
            return Err(RadiometryError::InvalidExposure(
                "integration time must be positive".to_string(),
            ));
        }
        if !self.pixel_area_m2.is_finite() || self.pixel_area_m2 <= 0.0 {
            return Err(RadiometryError::InvalidExposure(format!(
                "pixel area must be positive, got {}",
                self.pixel_area_m2
            )));
        }
        Ok(self.integration.as_secs_f64() * self.pixel_area_m2)
    }
}

impl PhotonCube {
    /// Expected photon counts for an exposure, without noise
    pub fn mean_photon_counts(&self, exposure: &Exposure) -> Result<Array3<f64>, RadiometryError> {
        let scale = exposure.count_scale()?;
        let photons = self.photons().ok_or(RadiometryError::NoPhotonData)?;
        Ok(photons.mapv(|rate| rate * scale))
    }

    /// Poisson-sampled photon counts for an exposure.
    ///
    /// A fixed `seed` reproduces the same realization.
    pub fn photon_noise(
        &self,
        exposure: &Exposure,
        seed: Option<u64>,
    ) -> Result<Array3<f64>, RadiometryError> {
        let mean_counts = self.mean_photon_counts(exposure)?;
        debug!(
            "Sampling shot noise over {:?} cube, {:?} integration",
            mean_counts.dim(),
            exposure.integration
        );
        Ok(apply_poisson_photon_noise(&mean_counts, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::WaveSamples;
    use approx::assert_relative_eq;

    fn cube_with_rate(rate: f64) -> PhotonCube {
        let wave = WaveSamples::new(vec![450.0, 550.0]).unwrap();
        let mut cube = PhotonCube::default();
        cube.set_photons(Array3::from_elem((8, 8, 2), rate), &wave)
            .unwrap();
        cube
    }

    #[test]
    fn test_mean_counts_scale_with_exposure() {
        let cube = cube_with_rate(1e12);
        let exposure = Exposure::new(Duration::from_millis(50), 4e-12);
        let counts = cube.mean_photon_counts(&exposure).unwrap();
        assert_relative_eq!(counts[[3, 3, 1]], 1e12 * 0.05 * 4e-12, max_relative = 1e-12);
    }

    #[test]
    fn test_noise_is_seeded_and_integral() {
        let cube = cube_with_rate(5e12);
        let exposure = Exposure::new(Duration::from_millis(1), 1e-9);
        let a = cube.photon_noise(&exposure, Some(11)).unwrap();
        let b = cube.photon_noise(&exposure, Some(11)).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.fract() == 0.0 && *v >= 0.0));
    }

    #[test]
    fn test_invalid_exposure() {
        let cube = cube_with_rate(1.0);
        let zero_time = Exposure::new(Duration::ZERO, 1e-12);
        assert!(matches!(
            cube.photon_noise(&zero_time, Some(1)),
            Err(RadiometryError::InvalidExposure(_))
        ));
        let bad_area = Exposure::new(Duration::from_secs(1), -1.0);
        assert!(matches!(
            cube.mean_photon_counts(&bad_area),
            Err(RadiometryError::InvalidExposure(_))
        ));
    }

    #[test]
    fn test_noise_needs_photons() {
        let cube = PhotonCube::default();
        let exposure = Exposure::new(Duration::from_secs(1), 1.0);
        assert_eq!(
            cube.photon_noise(&exposure, None),
            Err(RadiometryError::NoPhotonData)
        );
    }
}
