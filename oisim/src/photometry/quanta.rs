//! Quanta to energy conversion.
//!
//! A photon of wavelength λ carries E = h·c/λ joules. Photon cubes are
//! stored as photon rates per unit area per nm; converting each wavelength
//! plane by that factor yields spectral irradiance in W·m⁻²·nm⁻¹.

use ndarray::{Array3, Axis};

use crate::spectral::WaveSamples;

/// Physical constants in SI units.
pub struct SI {}

impl SI {
    /// Planck's constant
    /// Units: J⋅s
    pub const PLANCK_CONSTANT: f64 = 6.62607015e-34;

    /// Speed of light in vacuum
    /// Units: m/s
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

    /// Maximum photopic luminous efficacy
    /// Units: lm/W
    pub const LUMINOUS_EFFICACY: f64 = 683.0;
}

/// Energy of a single photon at `wavelength_nm`, in joules.
pub fn photon_energy_joules(wavelength_nm: f64) -> f64 {
    SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT / (wavelength_nm * 1e-9)
}

/// Convert a (row, col, wave) photon cube into energy units.
pub fn quanta_to_energy(photons: &Array3<f64>, wave: &WaveSamples) -> Array3<f64> {
    let mut energy = photons.clone();
    for (mut plane, &nm) in energy.axis_iter_mut(Axis(2)).zip(wave.as_slice()) {
        let scale = photon_energy_joules(nm);
        plane.mapv_inplace(|v| v * scale);
    }
    energy
}

/// Convert a (row, col, wave) energy cube into photon units.
pub fn energy_to_quanta(energy: &Array3<f64>, wave: &WaveSamples) -> Array3<f64> {
    let mut photons = energy.clone();
    for (mut plane, &nm) in photons.axis_iter_mut(Axis(2)).zip(wave.as_slice()) {
        let scale = photon_energy_joules(nm);
        plane.mapv_inplace(|v| v / scale);
    }
    photons
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_photon_energy_at_550nm() {
        // hc / 550nm ≈ 3.6117e-19 J
        assert_relative_eq!(photon_energy_joules(550.0), 3.6117e-19, max_relative = 1e-4);
    }

    #[test]
    fn test_energy_scales_inversely_with_wavelength() {
        assert_relative_eq!(
            photon_energy_joules(400.0) / photon_energy_joules(800.0),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cube_conversion_per_plane() {
        let wave = WaveSamples::new(vec![500.0, 600.0]).unwrap();
        let photons = Array3::from_elem((2, 3, 2), 1e18);
        let energy = quanta_to_energy(&photons, &wave);

        assert_relative_eq!(
            energy[[1, 2, 0]],
            1e18 * photon_energy_joules(500.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            energy[[0, 0, 1]],
            1e18 * photon_energy_joules(600.0),
            max_relative = 1e-12
        );

        let back = energy_to_quanta(&energy, &wave);
        assert_relative_eq!(back[[1, 1, 1]], 1e18, max_relative = 1e-12);
    }
}
