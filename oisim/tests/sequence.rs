//! End-to-end tests for optical image sequences.

use approx::assert_relative_eq;
use oisim::sequence::{ConstructionError, TimeAxis};
use oisim::{Composition, ModulationRegion, OiSequence, OpticalImage, WaveSamples, XorRule};
use shared::units::LengthUnit;

fn uniform_pair(rows: usize, cols: usize) -> (OpticalImage, OpticalImage) {
    let _ = env_logger::builder().is_test(true).try_init();
    let wave = WaveSamples::uniform(450.0, 650.0, 50.0).unwrap();
    (
        OpticalImage::uniform(wave.clone(), rows, cols, 10.0).unwrap(),
        OpticalImage::uniform(wave, rows, cols, 4.0).unwrap(),
    )
}

#[test]
fn test_scalar_time_axis_expands() {
    let (fixed, modulated) = uniform_pair(2, 2);
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![0.1, 0.2, 0.3, 0.4, 0.5],
        vec![0.001],
        Composition::Add,
        ModulationRegion::WholeFrame,
    )
    .unwrap();

    assert_eq!(seq.len(), 5);
    let expected = [0.0, 0.001, 0.002, 0.003, 0.004];
    assert_eq!(seq.time_axis().len(), expected.len());
    for (t, e) in seq.time_axis().iter().zip(expected) {
        assert_relative_eq!(*t, e, epsilon = 1e-15);
    }
}

#[test]
fn test_mismatched_time_axis_fails() {
    let (fixed, modulated) = uniform_pair(2, 2);
    let result = OiSequence::new(
        fixed,
        modulated,
        vec![0.0; 5],
        vec![0.0, 0.001, 0.002],
        Composition::Add,
        ModulationRegion::WholeFrame,
    );
    assert!(matches!(result, Err(ConstructionError::LengthMismatch { .. })));
}

#[test]
fn test_add_composition_end_to_end() {
    let (fixed, modulated) = uniform_pair(4, 5);
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![0.0, 0.5, 1.0],
        vec![0.0, 0.01, 0.02],
        Composition::Add,
        ModulationRegion::WholeFrame,
    )
    .unwrap();

    for (index, expected) in [(0, 10.0), (1, 12.0), (2, 14.0)] {
        let frame = seq.frame_at_index(index).unwrap();
        let photons = frame.photons().unwrap();
        assert_eq!(photons.dim(), (4, 5, 5));
        assert!(
            photons.iter().all(|&v| v == expected),
            "frame {index} should be {expected} everywhere"
        );
    }
}

#[test]
fn test_serial_and_parallel_frames_agree() {
    let (fixed, modulated) = uniform_pair(6, 6);
    let seq = OiSequence::new(
        fixed,
        modulated,
        (0..8).map(|i| i as f64 / 7.0).collect(),
        TimeAxis::Step(0.002),
        Composition::Blend,
        ModulationRegion::WholeFrame,
    )
    .unwrap();

    let serial = seq.frames().collect::<Result<Vec<_>, _>>().unwrap();
    let parallel = seq.frames_par().unwrap();
    assert_eq!(serial.len(), 8);
    for (a, b) in serial.iter().zip(&parallel) {
        assert_eq!(a.photons(), b.photons());
    }
    assert_relative_eq!(serial[7].photons().unwrap()[[0, 0, 0]], 4.0, epsilon = 1e-12);
}

#[test]
fn test_disk_region_limits_modulation() {
    let (fixed, modulated) = uniform_pair(9, 9);
    let dx = fixed.sample_size(LengthUnit::Micrometers, None).unwrap();
    // covers the centre pixel and its four edge neighbours
    let radius_um = dx * 1.2;

    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![1.0],
        TimeAxis::Step(0.01),
        Composition::Add,
        ModulationRegion::Disk { radius_um },
    )
    .unwrap();
    let frame = seq.frame_at_index(0).unwrap();
    let photons = frame.photons().unwrap();

    assert_eq!(photons[[4, 4, 0]], 14.0);
    assert_eq!(photons[[3, 4, 2]], 14.0);
    assert_eq!(photons[[4, 5, 4]], 14.0);
    assert_eq!(photons[[3, 3, 0]], 10.0);
    assert_eq!(photons[[0, 0, 0]], 10.0);
    let modulated_pixels = photons
        .index_axis(ndarray::Axis(2), 0)
        .iter()
        .filter(|&&v| v == 14.0)
        .count();
    assert_eq!(modulated_pixels, 5);
}

#[test]
fn test_xor_rules() {
    let (fixed, modulated) = uniform_pair(9, 9);
    let dx = fixed.sample_size(LengthUnit::Micrometers, None).unwrap();
    let region = ModulationRegion::Disk { radius_um: dx * 0.5 };

    let scaled = OiSequence::new(
        fixed.clone(),
        modulated.clone(),
        vec![0.25, 1.0],
        TimeAxis::Step(0.01),
        Composition::Xor(XorRule::Scaled),
        region,
    )
    .unwrap();
    let frame = scaled.frame_at_index(0).unwrap();
    assert_eq!(frame.photons().unwrap()[[4, 4, 0]], 1.0);
    assert_eq!(frame.photons().unwrap()[[0, 4, 0]], 10.0);

    let threshold = OiSequence::new(
        fixed,
        modulated,
        vec![0.25, 1.0],
        TimeAxis::Step(0.01),
        Composition::Xor(XorRule::Threshold(0.5)),
        region,
    )
    .unwrap();
    assert_eq!(threshold.frame_at_index(0).unwrap().photons().unwrap()[[4, 4, 0]], 10.0);
    assert_eq!(threshold.frame_at_index(1).unwrap().photons().unwrap()[[4, 4, 0]], 4.0);
}

#[test]
fn test_spatial_support_mismatch_fails() {
    let (fixed, mut modulated) = uniform_pair(4, 4);
    modulated.set_distance(fixed.distance(LengthUnit::Meters) * 2.0).unwrap();
    let result = OiSequence::new(
        fixed,
        modulated,
        vec![1.0],
        TimeAxis::Step(0.01),
        Composition::Add,
        ModulationRegion::WholeFrame,
    );
    assert!(matches!(result, Err(ConstructionError::SpacingMismatch { .. })));
}

#[test]
fn test_base_images_never_mutated() {
    let (fixed, modulated) = uniform_pair(3, 3);
    let fixed_before = fixed.photons().unwrap().clone();
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![1.0, 0.5],
        TimeAxis::Step(0.01),
        Composition::Blend,
        ModulationRegion::WholeFrame,
    )
    .unwrap();
    for frame in seq.frames() {
        frame.unwrap();
    }
    assert_eq!(seq.fixed().photons().unwrap(), &fixed_before);
}

#[test]
fn test_eye_movement_count() {
    let (fixed, modulated) = uniform_pair(2, 2);
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![0.0; 100],
        TimeAxis::Step(0.001),
        Composition::Add,
        ModulationRegion::WholeFrame,
    )
    .unwrap();
    assert_relative_eq!(seq.time_step().unwrap(), 0.001);
    assert_eq!(seq.max_eye_movements_given_integration_time(0.01).unwrap(), 10);
    assert_eq!(seq.max_eye_movements_given_integration_time(0.03).unwrap(), 3);
}

#[test]
fn test_blend_inside_disk_only() {
    let (fixed, modulated) = uniform_pair(9, 9);
    let dx = fixed.sample_size(LengthUnit::Micrometers, None).unwrap();
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![0.25],
        TimeAxis::Step(0.01),
        Composition::Blend,
        ModulationRegion::Disk { radius_um: dx * 1.2 },
    )
    .unwrap();
    let frame = seq.frame_at_index(0).unwrap();
    let photons = frame.photons().unwrap();

    // 10·(1 − 0.25) + 4·0.25
    let inside = 8.5;
    for (r, c) in [(4, 4), (3, 4), (5, 4), (4, 3), (4, 5)] {
        assert!(photons.slice(ndarray::s![r, c, ..]).iter().all(|&v| v == inside));
    }
    for (r, c) in [(3, 3), (0, 0), (8, 8), (4, 0)] {
        assert!(photons.slice(ndarray::s![r, c, ..]).iter().all(|&v| v == 10.0));
    }
    let blended = photons
        .index_axis(ndarray::Axis(2), 0)
        .iter()
        .filter(|&&v| v == inside)
        .count();
    assert_eq!(blended, 5);
}

#[test]
fn test_negative_composite_rejected_at_construction() {
    let (fixed, modulated) = uniform_pair(3, 3);
    let result = OiSequence::new(
        fixed,
        modulated,
        vec![1.0, -5.0],
        TimeAxis::Step(0.01),
        Composition::Add,
        ModulationRegion::WholeFrame,
    );
    assert!(matches!(
        result,
        Err(ConstructionError::WeightOutOfRange { index: 1, .. })
    ));
}

#[test]
fn test_uneven_time_axis_duration() {
    let (fixed, modulated) = uniform_pair(2, 2);
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![0.0, 0.5, 1.0],
        vec![0.0, 0.001, 0.010],
        Composition::Add,
        ModulationRegion::WholeFrame,
    )
    .unwrap();
    assert_relative_eq!(seq.duration().unwrap(), 0.011, epsilon = 1e-15);
    assert_eq!(seq.max_eye_movements_given_integration_time(0.001).unwrap(), 11);
}

#[test]
fn test_one_frame_step_sequence_timing() {
    let (fixed, modulated) = uniform_pair(2, 2);
    let seq = OiSequence::new(
        fixed,
        modulated,
        vec![1.0],
        TimeAxis::Step(0.005),
        Composition::Add,
        ModulationRegion::WholeFrame,
    )
    .unwrap();
    assert_relative_eq!(seq.time_step().unwrap(), 0.005);
    assert_eq!(seq.max_eye_movements_given_integration_time(0.005).unwrap(), 1);
    assert_eq!(seq.max_eye_movements_given_integration_time(0.001).unwrap(), 5);
}
