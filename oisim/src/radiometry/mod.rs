//! Radiometric data: the photon cube, its derived values, ROI reductions
//! and shot noise.

pub mod memo;
pub mod noise;
pub mod photon_cube;
pub mod roi;

pub use memo::Memoized;
pub use noise::Exposure;
pub use photon_cube::{PhotonCube, Precision, RadiometryError};
pub use roi::rect_locations;
