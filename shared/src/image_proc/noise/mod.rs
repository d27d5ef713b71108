//! Noise generation for photon-limited imaging

pub mod generate;

pub use generate::{apply_poisson_photon_noise, sample_photon_count, POISSON_EXACT_LIMIT};
