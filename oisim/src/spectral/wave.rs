//! Wavelength sampling shared by every spectral entity.
//!
//! A [`WaveSamples`] is an ordered, strictly increasing list of wavelengths
//! in nanometers. Spacing may be uniform or not; the bin width used by
//! spectral integrals is always the gap between the first two samples.

use serde::{Deserialize, Serialize};
use shared::algo::{is_ascending, nearest_index};
use thiserror::Error;

/// Largest sample count a uniform axis may expand to
pub const MAX_UNIFORM_SAMPLES: usize = 100_000;

/// Errors raised while constructing a wavelength axis
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WaveError {
    #[error("Wavelength axis must contain at least one sample")]
    Empty,

    #[error("Wavelength samples must be finite and positive, got {0}")]
    InvalidSample(f64),

    #[error("Wavelength samples must be strictly increasing")]
    NotAscending,

    #[error("Invalid uniform range {start}:{step}:{end}")]
    InvalidRange { start: f64, end: f64, step: f64 },
}

/// Outcome of replacing a wavelength axis
#[derive(Debug, Clone, PartialEq)]
pub enum WaveChange {
    /// The new samples equal the current ones; nothing was touched
    Unchanged,
    /// The axis was replaced; the previous samples are handed back so
    /// dependents can resample against them
    Replaced { previous: WaveSamples },
}

/// Ordered wavelength samples in nanometers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WaveSamples {
    nm: Vec<f64>,
}

impl WaveSamples {
    /// Build an axis from explicit samples.
    ///
    /// Samples must be finite, positive and strictly increasing. They are
    /// never sorted on the caller's behalf.
    pub fn new(nm: Vec<f64>) -> Result<Self, WaveError> {
        if nm.is_empty() {
            return Err(WaveError::Empty);
        }
        if let Some(&bad) = nm.iter().find(|v| !v.is_finite() || **v <= 0.0) {
            return Err(WaveError::InvalidSample(bad));
        }
        if !is_ascending(&nm) {
            return Err(WaveError::NotAscending);
        }
        Ok(Self { nm })
    }

    /// Uniformly spaced axis `start, start + step, ...` up to and including `end`.
    ///
    /// Steps small enough to exceed [`MAX_UNIFORM_SAMPLES`] are rejected.
    pub fn uniform(start_nm: f64, end_nm: f64, step_nm: f64) -> Result<Self, WaveError> {
        let invalid = WaveError::InvalidRange {
            start: start_nm,
            end: end_nm,
            step: step_nm,
        };
        let bad_step = step_nm.is_nan() || step_nm <= 0.0;
        if bad_step || !start_nm.is_finite() || !end_nm.is_finite() || end_nm < start_nm {
            return Err(invalid);
        }

        // Tolerate floating error on the last sample, e.g. 400:0.1:700
        let intervals = ((end_nm - start_nm) / step_nm + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_UNIFORM_SAMPLES as f64 {
            return Err(invalid);
        }
        let count = intervals as usize + 1;
        let nm = (0..count)
            .map(|i| start_nm + i as f64 * step_nm)
            .collect::<Vec<_>>();
        Self::new(nm)
    }

    /// Single wavelength sample
    pub fn monochromatic(nm: f64) -> Result<Self, WaveError> {
        Self::new(vec![nm])
    }

    /// Visible band, 400 to 700 nm in 10 nm steps
    pub fn visible() -> Self {
        Self {
            nm: (0..31).map(|i| 400.0 + 10.0 * i as f64).collect(),
        }
    }

    /// Samples as a slice, in nanometers
    pub fn as_slice(&self) -> &[f64] {
        &self.nm
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.nm.len()
    }

    /// Always false; an axis holds at least one sample
    pub fn is_empty(&self) -> bool {
        self.nm.is_empty()
    }

    /// Spectral bin width in nanometers.
    ///
    /// Difference of the first two samples, or 1 for a single-sample axis.
    pub fn bin_width(&self) -> f64 {
        if self.nm.len() < 2 {
            1.0
        } else {
            self.nm[1] - self.nm[0]
        }
    }

    /// Shortest wavelength on the axis
    pub fn min_nm(&self) -> f64 {
        self.nm[0]
    }

    /// Longest wavelength on the axis
    pub fn max_nm(&self) -> f64 {
        self.nm[self.nm.len() - 1]
    }

    /// True when `other` spans a range inside (or equal to) this axis' range.
    pub fn covers(&self, other: &WaveSamples) -> bool {
        other.min_nm() >= self.min_nm() && other.max_nm() <= self.max_nm()
    }

    /// Index of the sample closest to `nm`
    pub fn nearest_index(&self, nm: f64) -> usize {
        nearest_index(nm, &self.nm).unwrap_or(0)
    }

    /// Nearest sample indices for a list of requested wavelengths
    pub fn nearest_indices(&self, nm: &[f64]) -> Vec<usize> {
        nm.iter().map(|&w| self.nearest_index(w)).collect()
    }

    /// Replace the samples wholesale.
    ///
    /// Structurally equal samples are a no-op and report
    /// [`WaveChange::Unchanged`].
    pub fn replace(&mut self, new: WaveSamples) -> WaveChange {
        if *self == new {
            return WaveChange::Unchanged;
        }
        let previous = std::mem::replace(self, new);
        WaveChange::Replaced { previous }
    }
}

impl Default for WaveSamples {
    fn default() -> Self {
        Self::visible()
    }
}

impl TryFrom<Vec<f64>> for WaveSamples {
    type Error = WaveError;

    fn try_from(nm: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(nm)
    }
}

impl From<WaveSamples> for Vec<f64> {
    fn from(wave: WaveSamples) -> Self {
        wave.nm
    }
}
