//! Miscellaneous 1-D sampling helpers.
//!
//! Linear interpolation over tabulated data, its extend-with-constant
//! variant used for spectral resampling, and nearest-sample lookup.

use thiserror::Error;

/// Errors that can occur during interpolation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Value {0} is out of bounds for interpolation range [{1}, {2}]")]
    OutOfBounds(f64, f64, f64),
    #[error("Input vectors must have at least 1 point")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
}

/// Check that a table of sample positions is usable for interpolation.
fn validate_table(xs: &[f64], ys: &[f64]) -> Result<(), InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths);
    }
    if xs.is_empty() {
        return Err(InterpError::InsufficientData);
    }
    if !is_ascending(xs) {
        return Err(InterpError::UnsortedData);
    }
    Ok(())
}

/// Returns true when every element is strictly greater than the one before it.
pub fn is_ascending(xs: &[f64]) -> bool {
    xs.windows(2).all(|w| w[1] > w[0])
}

/// Bracketing segment for `x` inside an ascending table.
///
/// Returns `(lower_index, upper_index, t)` so that the interpolated value is
/// `ys[lower] * (1 - t) + ys[upper] * t`, or `None` when `x` falls outside
/// `[xs[0], xs[n-1]]`.
pub fn bracket(x: f64, xs: &[f64]) -> Option<(usize, usize, f64)> {
    let n = xs.len();
    if n == 0 || x < xs[0] || x > xs[n - 1] {
        return None;
    }
    if n == 1 {
        return Some((0, 0, 0.0));
    }

    // partition_point returns the index of the first element > x
    let idx = xs.partition_point(|&val| val <= x);
    if idx == 0 {
        return Some((0, 0, 0.0));
    }
    if idx == n {
        return Some((n - 1, n - 1, 0.0));
    }

    let x1 = xs[idx - 1];
    let x2 = xs[idx];
    Some((idx - 1, idx, (x - x1) / (x2 - x1)))
}

/// Performs linear interpolation on 1D data using binary search.
///
/// # Returns
///
/// * `Ok(f64)` - The interpolated y-value at position x
/// * `Err(InterpError::OutOfBounds)` if x lies outside the table
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    validate_table(xs, ys)?;
    match bracket(x, xs) {
        Some((lo, hi, t)) => Ok(ys[lo] * (1.0 - t) + ys[hi] * t),
        None => Err(InterpError::OutOfBounds(x, xs[0], xs[xs.len() - 1])),
    }
}

/// Linear interpolation that returns `fill` for queries outside the table.
///
/// Evaluates every query point in `x_new` against the table `(xs, ys)`.
pub fn interp_extend(
    x_new: &[f64],
    xs: &[f64],
    ys: &[f64],
    fill: f64,
) -> Result<Vec<f64>, InterpError> {
    validate_table(xs, ys)?;
    Ok(x_new
        .iter()
        .map(|&x| match bracket(x, xs) {
            Some((lo, hi, t)) => ys[lo] * (1.0 - t) + ys[hi] * t,
            None => fill,
        })
        .collect())
}

/// Index of the sample in `xs` closest to `x`.
///
/// Ties resolve to the lower index. Returns `None` for an empty table.
pub fn nearest_index(x: f64, xs: &[f64]) -> Option<usize> {
    xs.iter()
        .enumerate()
        .map(|(i, &v)| (i, (v - x).abs()))
        .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

/// Round to a fixed number of decimal places.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        let ys = vec![10.0, 20.0, 30.0, 40.0];
        assert_eq!(interp(2.0, &xs, &ys).unwrap(), 20.0);
        assert_eq!(interp(4.0, &xs, &ys).unwrap(), 40.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let xs = vec![1.0, 2.0, 3.0];
        let ys = vec![10.0, 20.0, 30.0];
        assert_eq!(interp(1.5, &xs, &ys).unwrap(), 15.0);
        assert_eq!(interp(2.5, &xs, &ys).unwrap(), 25.0);
    }

    #[test]
    fn test_out_of_bounds() {
        let xs = vec![1.0, 2.0, 3.0];
        let ys = vec![10.0, 20.0, 30.0];
        assert!(matches!(
            interp(0.5, &xs, &ys),
            Err(InterpError::OutOfBounds(_, _, _))
        ));
    }

    #[test]
    fn test_unsorted_and_mismatched() {
        assert_eq!(
            interp(1.0, &[2.0, 1.0], &[0.0, 0.0]),
            Err(InterpError::UnsortedData)
        );
        assert_eq!(
            interp(1.0, &[1.0, 2.0], &[0.0]),
            Err(InterpError::MismatchedLengths)
        );
    }

    #[test]
    fn test_interp_extend_fills_outside() {
        let xs = vec![400.0, 500.0, 600.0];
        let ys = vec![1.0, 2.0, 3.0];
        let out = interp_extend(&[350.0, 450.0, 600.0, 650.0], &xs, &ys, 0.0).unwrap();
        assert_eq!(out, vec![0.0, 1.5, 3.0, 0.0]);
    }

    #[test]
    fn test_single_point_table() {
        let out = interp_extend(&[550.0, 560.0], &[550.0], &[7.0], 0.0).unwrap();
        assert_eq!(out, vec![7.0, 0.0]);
    }

    #[test]
    fn test_nearest_index() {
        let xs = vec![400.0, 410.0, 420.0];
        assert_eq!(nearest_index(404.0, &xs), Some(0));
        assert_eq!(nearest_index(406.0, &xs), Some(1));
        assert_eq!(nearest_index(405.0, &xs), Some(0));
        assert_eq!(nearest_index(999.0, &xs), Some(2));
        assert_eq!(nearest_index(1.0, &[]), None);
    }

    #[test]
    fn test_round_to_decimals() {
        assert_eq!(round_to_decimals(1.234_567_891, 7), 1.234_567_9);
        assert_eq!(round_to_decimals(-0.5, 0), -1.0);
    }
}
