pub mod resample;

pub use resample::{interpolate_cube, resample_spectrum, ResampleError};
