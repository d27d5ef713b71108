//! Optical image entity and its accessor contract.

pub mod accessor;
pub mod components;
pub mod error;
pub mod geometry;
pub mod optical_image;
pub mod param;

pub use components::{Diffuser, DiffuserMethod, ShiftVariantPsf};
pub use error::OiError;
pub use optical_image::{OpticalImage, WaveUpdate};
pub use param::OiParam;
