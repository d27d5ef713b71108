//! Photon shot noise generation.
//!
//! Photon arrivals follow Poisson statistics. Each element of a mean-count
//! array is replaced by a draw from Poisson(mean). Small means are sampled
//! exactly; above [`POISSON_EXACT_LIMIT`] a rounded Gaussian with matching
//! mean and variance is used for speed.
//!
//! Arrays are processed in parallel row chunks via
//! [`process_array_in_parallel_chunks`], so a fixed seed always produces the
//! same noise realization.

use ndarray::{Array, Dimension};
use rand::{thread_rng, Rng, RngCore};
use rand_distr::{Distribution, Normal, Poisson};

use crate::algo::process_array_in_parallel_chunks;

/// Means below this value are drawn from the exact Poisson distribution.
pub const POISSON_EXACT_LIMIT: f64 = 15.0;

/// Draw a single photon count with the given mean.
///
/// Non-positive or non-finite means yield zero photons.
pub fn sample_photon_count<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> f64 {
    if !mean.is_finite() || mean <= 0.0 {
        return 0.0;
    }

    if mean < POISSON_EXACT_LIMIT {
        match Poisson::new(mean) {
            Ok(poisson) => poisson.sample(rng),
            Err(_) => 0.0,
        }
    } else {
        match Normal::new(mean, mean.sqrt()) {
            Ok(normal) => normal.sample(rng).round().max(0.0),
            Err(_) => mean.round(),
        }
    }
}

/// Apply Poisson arrival statistics to an array of mean photon counts.
///
/// # Arguments
/// * `mean_counts` - Array of expected counts, any dimensionality
/// * `rng_seed` - Optional seed for random number generator
///
/// # Returns
/// * An array of the same shape holding sampled integer-valued counts
pub fn apply_poisson_photon_noise<D: Dimension>(
    mean_counts: &Array<f64, D>,
    rng_seed: Option<u64>,
) -> Array<f64, D> {
    let seed = rng_seed.unwrap_or_else(|| thread_rng().next_u64());

    process_array_in_parallel_chunks(mean_counts.clone(), seed, Some(64), |chunk, rng| {
        chunk
            .iter_mut()
            .for_each(|value| *value = sample_photon_count(*value, rng));
    })
}
