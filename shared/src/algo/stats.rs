//! Statistical helpers for checking simulated photon counts

/// Sample mean and unbiased sample variance.
///
/// Returns `None` for fewer than two samples.
pub fn mean_and_variance(samples: &[f64]) -> Option<(f64, f64)> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some((mean, variance))
}

/// Poisson probability mass function P(K = k) for rate `lambda`.
///
/// Evaluated in log space so large `k` does not overflow the factorial.
pub fn poisson_pmf(k: u64, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    let ln_factorial: f64 = (1..=k).map(|i| (i as f64).ln()).sum();
    (k as f64 * lambda.ln() - lambda - ln_factorial).exp()
}

/// Poisson cumulative distribution P(K <= k) for rate `lambda`.
pub fn poisson_cdf(k: u64, lambda: f64) -> f64 {
    (0..=k).map(|i| poisson_pmf(i, lambda)).sum::<f64>().min(1.0)
}

/// Largest gap between the empirical CDF of integer-valued `samples` and the
/// Poisson CDF, evaluated at every integer from 0 to `k_max`.
pub fn poisson_cdf_max_deviation(samples: &[f64], lambda: f64, k_max: u64) -> f64 {
    if samples.is_empty() {
        return 1.0;
    }
    let n = samples.len() as f64;
    (0..=k_max)
        .map(|k| {
            let empirical = samples.iter().filter(|&&s| s <= k as f64).count() as f64 / n;
            (empirical - poisson_cdf(k, lambda)).abs()
        })
        .fold(0.0, f64::max)
}
