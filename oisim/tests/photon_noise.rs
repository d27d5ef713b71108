//! Shot noise statistics on optical image photon cubes.

use std::time::Duration;

use oisim::{Exposure, OpticalImage, WaveSamples};
use shared::algo::stats::{mean_and_variance, poisson_cdf_max_deviation};

fn flat_oi(rows: usize, cols: usize, rate: f64) -> OpticalImage {
    let wave = WaveSamples::monochromatic(550.0).unwrap();
    OpticalImage::uniform(wave, rows, cols, rate).unwrap()
}

#[test]
fn test_poisson_moments_at_lambda_eight() {
    // 16 photons/s/m² over 0.5 s on 1 m² pixels
    let oi = flat_oi(250, 200, 16.0);
    let exposure = Exposure::new(Duration::from_millis(500), 1.0);

    let counts = oi.cube().photon_noise(&exposure, Some(7)).unwrap();
    assert_eq!(counts.dim(), (250, 200, 1));
    let samples: Vec<f64> = counts.iter().copied().collect();
    assert!(samples.iter().all(|v| v.fract() == 0.0 && *v >= 0.0));

    let (mean, variance) = mean_and_variance(&samples).unwrap();
    assert!((mean - 8.0).abs() < 0.05, "mean {mean}");
    assert!((variance - 8.0).abs() < 0.3, "variance {variance}");
}

#[test]
fn test_small_lambda_matches_poisson_cdf() {
    let oi = flat_oi(200, 100, 2.5);
    let exposure = Exposure::new(Duration::from_secs(1), 1.0);

    let counts = oi.cube().photon_noise(&exposure, Some(11)).unwrap();
    let samples: Vec<f64> = counts.iter().copied().collect();
    let deviation = poisson_cdf_max_deviation(&samples, 2.5, 12);
    assert!(deviation < 0.02, "max CDF deviation {deviation}");
}

#[test]
fn test_seed_reproduces_realization() {
    let oi = flat_oi(32, 32, 40.0);
    let exposure = Exposure::new(Duration::from_millis(250), 1.0);

    let a = oi.cube().photon_noise(&exposure, Some(99)).unwrap();
    let b = oi.cube().photon_noise(&exposure, Some(99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_invalid_exposure_rejected() {
    let oi = flat_oi(4, 4, 10.0);
    assert!(oi
        .cube()
        .photon_noise(&Exposure::new(Duration::ZERO, 1.0), None)
        .is_err());
    assert!(oi
        .cube()
        .photon_noise(&Exposure::new(Duration::from_secs(1), 0.0), None)
        .is_err());
}
