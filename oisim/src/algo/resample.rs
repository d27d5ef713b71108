//! Linear resampling of spectral data along the wavelength axis.
//!
//! Every pixel's spectrum is interpolated independently. Query wavelengths
//! outside the source range are filled with zero. The bracketing weights
//! depend only on the two axes, so they are computed once and applied
//! plane by plane.

use ndarray::{Array1, Array3, Axis};
use shared::algo::{bracket, interp_extend, InterpError};
use thiserror::Error;

use crate::spectral::WaveSamples;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResampleError {
    #[error("Cube has {cube} wavelength planes but the source axis has {wave} samples")]
    WaveCountMismatch { cube: usize, wave: usize },

    #[error("Interpolation failed: {0}")]
    Interp(#[from] InterpError),
}

/// Interpolation weights for one target wavelength
#[derive(Debug, Clone, Copy, PartialEq)]
enum Weight {
    /// `(1 - t) * src[lo] + t * src[hi]`
    Linear { lo: usize, hi: usize, t: f64 },
    /// Outside the source range
    Zero,
}

fn weights(old: &WaveSamples, new: &WaveSamples) -> Vec<Weight> {
    new.as_slice()
        .iter()
        .map(|&nm| match bracket(nm, old.as_slice()) {
            Some((lo, hi, t)) => Weight::Linear { lo, hi, t },
            None => Weight::Zero,
        })
        .collect()
}

/// Resample a `(row, col, wave)` cube from `old` to `new` wavelengths.
pub fn interpolate_cube(
    old: &WaveSamples,
    new: &WaveSamples,
    cube: &Array3<f64>,
) -> Result<Array3<f64>, ResampleError> {
    let (rows, cols, n_wave) = cube.dim();
    if n_wave != old.len() {
        return Err(ResampleError::WaveCountMismatch {
            cube: n_wave,
            wave: old.len(),
        });
    }
    if old == new {
        return Ok(cube.clone());
    }

    let mut out = Array3::zeros((rows, cols, new.len()));
    for (mut plane, weight) in out.axis_iter_mut(Axis(2)).zip(weights(old, new)) {
        if let Weight::Linear { lo, hi, t } = weight {
            plane.scaled_add(1.0 - t, &cube.index_axis(Axis(2), lo));
            if t > 0.0 {
                plane.scaled_add(t, &cube.index_axis(Axis(2), hi));
            }
        }
    }
    Ok(out)
}

/// Resample a single spectrum tabulated on `old` onto `new`, zero outside.
pub fn resample_spectrum(
    old: &WaveSamples,
    new: &WaveSamples,
    values: &[f64],
) -> Result<Array1<f64>, ResampleError> {
    if values.len() != old.len() {
        return Err(ResampleError::WaveCountMismatch {
            cube: values.len(),
            wave: old.len(),
        });
    }
    Ok(Array1::from(interp_extend(
        new.as_slice(),
        old.as_slice(),
        values,
        0.0,
    )?))
}
