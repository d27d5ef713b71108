//! Spectral optical image simulation
//!
//! This crate models the irradiance image formed by an eye or camera at its
//! focal plane: a wavelength-indexed photon cube with derived photometry,
//! a parameter accessor surface over it, wavelength resampling, and lazily
//! composed temporal sequences of optical images.

pub mod algo;
pub mod config;
pub mod oi;
pub mod optics;
pub mod param;
pub mod photometry;
pub mod radiometry;
pub mod scene;
pub mod sequence;
pub mod spectral;

// Re-exports for easier access
pub use config::{ConfigError, SequenceConfig};
pub use oi::{OiError, OiParam, OpticalImage, WaveUpdate};
pub use optics::{Lens, Optics};
pub use param::ParamValue;
pub use radiometry::{Exposure, PhotonCube, Precision, RadiometryError};
pub use scene::{SceneDescriptor, SceneGeometry};
pub use sequence::{Composition, ModulationRegion, OiSequence, SequenceError, XorRule};
pub use spectral::WaveSamples;
