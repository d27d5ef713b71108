//! Region-of-interest reductions over a photon cube.
//!
//! A region is a list of `(row, col)` pixel coordinates. Gathering returns
//! one spectrum per location, shape `(n_locations, n_wave)`; the mean
//! variants collapse that along the location axis.

use ndarray::{s, Array1, Array2, Array3, Axis};

use super::photon_cube::{PhotonCube, RadiometryError};
use crate::spectral::WaveSamples;

/// Gather the spectra at each `(row, col)` location.
fn gather(cube: &Array3<f64>, locations: &[(usize, usize)]) -> Result<Array2<f64>, RadiometryError> {
    if locations.is_empty() {
        return Err(RadiometryError::InvalidRegion(
            "location list is empty".to_string(),
        ));
    }
    let (rows, cols, n_wave) = cube.dim();
    if let Some(&(r, c)) = locations.iter().find(|(r, c)| *r >= rows || *c >= cols) {
        return Err(RadiometryError::InvalidRegion(format!(
            "location ({r}, {c}) outside {rows}x{cols} image"
        )));
    }

    let mut out = Array2::zeros((locations.len(), n_wave));
    for (mut row, &(r, c)) in out.axis_iter_mut(Axis(0)).zip(locations) {
        row.assign(&cube.slice(s![r, c, ..]));
    }
    Ok(out)
}

fn mean_over_locations(gathered: Array2<f64>) -> Array1<f64> {
    // gather() never returns an empty location axis
    gathered
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(gathered.ncols()))
}

impl PhotonCube {
    /// Photon spectra at each location, shape `(n_locations, n_wave)`
    pub fn roi_photons(&self, locations: &[(usize, usize)]) -> Result<Array2<f64>, RadiometryError> {
        let photons = self.photons().ok_or(RadiometryError::NoPhotonData)?;
        gather(photons, locations)
    }

    /// Mean photon spectrum over the locations
    pub fn roi_mean_photons(
        &self,
        locations: &[(usize, usize)],
    ) -> Result<Array1<f64>, RadiometryError> {
        self.roi_photons(locations).map(mean_over_locations)
    }

    /// Energy spectra at each location, shape `(n_locations, n_wave)`
    pub fn roi_energy(
        &self,
        wave: &WaveSamples,
        locations: &[(usize, usize)],
    ) -> Result<Array2<f64>, RadiometryError> {
        gather(&self.energy(wave)?, locations)
    }

    /// Mean energy spectrum over the locations
    pub fn roi_mean_energy(
        &self,
        wave: &WaveSamples,
        locations: &[(usize, usize)],
    ) -> Result<Array1<f64>, RadiometryError> {
        self.roi_energy(wave, locations).map(mean_over_locations)
    }
}

/// All `(row, col)` locations in a rectangle, row-major.
///
/// `rect` is `(row, col, height, width)` with the origin at its top-left.
pub fn rect_locations(rect: (usize, usize, usize, usize)) -> Vec<(usize, usize)> {
    let (row, col, height, width) = rect;
    (row..row + height)
        .flat_map(|r| (col..col + width).map(move |c| (r, c)))
        .collect()
}
