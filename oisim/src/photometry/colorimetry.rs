//! CIE 1931 colorimetry for spectral images.
//!
//! Color matching functions are evaluated from the multi-lobe piecewise
//! Gaussian fit of Wyman, Sloan and Shirley (2013), which tracks the
//! tabulated CIE 1931 2° observer closely across the visible band. The Y
//! matching function doubles as the photopic luminosity function V(λ).
//!
//! Illuminance and tristimulus values follow the usual discrete sums over
//! an energy cube E(row, col, λ):
//!
//! - lux = 683 · Δλ · Σ E·V
//! - XYZ = 683 · Δλ · Σ E·[x̄, ȳ, z̄]
//!
//! where Δλ is the bin width of the wavelength axis.

use ndarray::{Array2, Array3, Axis};

use super::quanta::SI;
use crate::spectral::WaveSamples;

/// Asymmetric Gaussian lobe with separate widths below and above the peak.
fn lobe(nm: f64, mu: f64, sigma_below: f64, sigma_above: f64) -> f64 {
    let sigma = if nm < mu { sigma_below } else { sigma_above };
    let t = (nm - mu) / sigma;
    (-0.5 * t * t).exp()
}

/// CIE 1931 x̄ color matching function
pub fn cie_x_bar(nm: f64) -> f64 {
    1.056 * lobe(nm, 599.8, 37.9, 31.0) + 0.362 * lobe(nm, 442.0, 16.0, 26.7)
        - 0.065 * lobe(nm, 501.1, 20.4, 26.2)
}

/// CIE 1931 ȳ color matching function
pub fn cie_y_bar(nm: f64) -> f64 {
    0.821 * lobe(nm, 568.8, 46.9, 40.5) + 0.286 * lobe(nm, 530.9, 16.3, 31.1)
}

/// CIE 1931 z̄ color matching function
pub fn cie_z_bar(nm: f64) -> f64 {
    1.217 * lobe(nm, 437.0, 11.8, 36.0) + 0.681 * lobe(nm, 459.0, 26.0, 13.8)
}

/// Photopic luminous efficiency V(λ)
pub fn photopic_luminosity(nm: f64) -> f64 {
    cie_y_bar(nm)
}

/// Color matching functions sampled on a wavelength axis, shape (n_wave, 3).
pub fn xyz_matching_table(wave: &WaveSamples) -> Array2<f64> {
    let mut table = Array2::zeros((wave.len(), 3));
    for (mut row, &nm) in table.axis_iter_mut(Axis(0)).zip(wave.as_slice()) {
        row[0] = cie_x_bar(nm);
        row[1] = cie_y_bar(nm);
        row[2] = cie_z_bar(nm);
    }
    table
}

/// Per-pixel illuminance in lux from an energy cube.
pub fn illuminance_from_energy(energy: &Array3<f64>, wave: &WaveSamples) -> Array2<f64> {
    let (rows, cols, _) = energy.dim();
    let weights = wave
        .as_slice()
        .iter()
        .map(|&nm| photopic_luminosity(nm))
        .collect::<Vec<_>>();
    let scale = SI::LUMINOUS_EFFICACY * wave.bin_width();

    let mut lux = Array2::zeros((rows, cols));
    for (plane, &v) in energy.axis_iter(Axis(2)).zip(&weights) {
        lux.scaled_add(v, &plane);
    }
    lux.mapv_inplace(|l| l * scale);
    lux
}

/// CIE XYZ tristimulus image, shape (rows, cols, 3), from an energy cube.
pub fn xyz_from_energy(energy: &Array3<f64>, wave: &WaveSamples) -> Array3<f64> {
    let (rows, cols, _) = energy.dim();
    let table = xyz_matching_table(wave);
    let scale = SI::LUMINOUS_EFFICACY * wave.bin_width();

    let mut xyz = Array3::zeros((rows, cols, 3));
    for (plane, cmf) in energy.axis_iter(Axis(2)).zip(table.axis_iter(Axis(0))) {
        for channel in 0..3 {
            xyz.index_axis_mut(Axis(2), channel)
                .scaled_add(cmf[channel] * scale, &plane);
        }
    }
    xyz
}
