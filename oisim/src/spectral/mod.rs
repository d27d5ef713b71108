//! Wavelength axis abstraction

pub mod wave;

pub use wave::{WaveChange, WaveError, WaveSamples};
