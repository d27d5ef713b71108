//! Parallel processing utilities for image and array operations
//!
//! Arrays are split into chunks along their first axis and handed out to
//! rayon workers. Every chunk gets its own RNG derived from a base seed, so
//! results are reproducible regardless of thread scheduling.

use ndarray::{Array, ArrayViewMut, Axis, Dimension};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Default number of leading-axis slices per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Process an array in parallel chunks with deterministic seeding
///
/// Chunks are taken along `Axis(0)`; for a photon cube indexed
/// `(row, col, wave)` that means blocks of whole rows. Chunk `k` is seeded
/// with `seed + k`.
///
/// # Arguments
/// * `array` - The array to process
/// * `seed` - Base seed for random number generation
/// * `chunk_size` - Optional chunk size along the first axis. Defaults to 64 if None.
/// * `processor` - Closure that processes each chunk with its own RNG
///
/// # Returns
/// The processed array
pub fn process_array_in_parallel_chunks<D, F>(
    mut array: Array<f64, D>,
    seed: u64,
    chunk_size: Option<usize>,
    processor: F,
) -> Array<f64, D>
where
    D: Dimension,
    F: Fn(&mut ArrayViewMut<f64, D>, &mut StdRng) + Send + Sync,
{
    let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE).max(1);
    if array.ndim() == 0 || array.is_empty() {
        return array;
    }

    array
        .axis_chunks_iter_mut(Axis(0), chunk_size)
        .into_par_iter()
        .enumerate()
        .for_each(|(chunk_idx, mut chunk)| {
            let chunk_seed = seed.wrapping_add(chunk_idx as u64);
            let mut rng = StdRng::seed_from_u64(chunk_seed);
            processor(&mut chunk, &mut rng);
        });

    array
}
