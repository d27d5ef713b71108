//! Image processing primitives shared across the workspace

pub mod noise;

pub use noise::{apply_poisson_photon_noise, sample_photon_count};
