//! Numeric algorithms shared across the workspace
//!
//! Interpolation and lookup over tabulated data, deterministic parallel
//! chunk processing, and statistics used to validate noise models.

pub mod misc;
pub mod parallel;
pub mod stats;

pub use misc::{
    bracket, interp, interp_extend, is_ascending, nearest_index, round_to_decimals, InterpError,
};
pub use parallel::process_array_in_parallel_chunks;
pub use stats::{mean_and_variance, poisson_cdf, poisson_pmf};
