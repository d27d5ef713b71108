use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oisim::{Composition, ModulationRegion, OiSequence, OpticalImage, WaveSamples};

fn make_sequence(size: usize, region: ModulationRegion) -> OiSequence {
    let wave = WaveSamples::visible();
    let fixed = OpticalImage::uniform(wave.clone(), size, size, 1e15).unwrap();
    let modulated = OpticalImage::uniform(wave, size, size, 5e14).unwrap();
    let modulation = (0..20).map(|i| i as f64 / 19.0).collect();
    OiSequence::new(
        fixed,
        modulated,
        modulation,
        vec![0.005],
        Composition::Blend,
        region,
    )
    .unwrap()
}

fn bench_frame_at_index(c: &mut Criterion) {
    let whole = make_sequence(128, ModulationRegion::WholeFrame);
    let disk = make_sequence(128, ModulationRegion::Disk { radius_um: 40.0 });

    let mut group = c.benchmark_group("frame_at_index");
    group.bench_function("blend_128x128x31", |b| {
        b.iter(|| black_box(whole.frame_at_index(black_box(10)).unwrap()))
    });
    group.bench_function("blend_disk_128x128x31", |b| {
        b.iter(|| black_box(disk.frame_at_index(black_box(10)).unwrap()))
    });
    group.finish();
}

fn bench_all_frames(c: &mut Criterion) {
    let seq = make_sequence(64, ModulationRegion::WholeFrame);

    let mut group = c.benchmark_group("all_frames");
    group.bench_function("serial_20x64x64", |b| {
        b.iter(|| black_box(seq.frames().collect::<Result<Vec<_>, _>>().unwrap()))
    });
    group.bench_function("parallel_20x64x64", |b| {
        b.iter(|| black_box(seq.frames_par().unwrap()))
    });
    group.finish();
}

fn bench_wave_resample(c: &mut Criterion) {
    let oi = OpticalImage::uniform(WaveSamples::visible(), 128, 128, 1e15).unwrap();
    let target = WaveSamples::uniform(420.0, 680.0, 2.0).unwrap();

    c.bench_function("resample_128x128_31_to_131", |b| {
        b.iter(|| black_box(oi.resampled_to(target.clone()).unwrap()))
    });
}

criterion_group!(benches, bench_frame_at_index, bench_all_frames, bench_wave_resample);
criterion_main!(benches);
