//! Criterion benchmarks for the oversampler variants
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use satura_core::{AudioBlock, Oversampler, PhaseMode};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 512;
const NUM_CHANNELS: usize = 2;

fn generate_test_signal() -> Vec<f32> {
    (0..NUM_CHANNELS * BLOCK_SIZE)
        .map(|i| {
            let t = (i % BLOCK_SIZE) as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("oversample_round_trip");

    for (label, mode) in [
        ("minimum_phase", PhaseMode::MinimumPhase),
        ("linear_phase", PhaseMode::LinearPhase),
    ] {
        for stages in 1..=3 {
            let mut os = Oversampler::new(stages, mode);
            os.prepare(BLOCK_SIZE, NUM_CHANNELS);
            let signal = generate_test_signal();

            group.bench_with_input(
                BenchmarkId::new(label, 1 << stages),
                &stages,
                |b, _| {
                    let mut storage = signal.clone();
                    b.iter(|| {
                        {
                            let block =
                                AudioBlock::new(&mut storage, NUM_CHANNELS, BLOCK_SIZE);
                            os.process_up(black_box(&block));
                        }
                        let mut block = AudioBlock::new(&mut storage, NUM_CHANNELS, BLOCK_SIZE);
                        os.process_down(&mut block);
                        black_box(block.channel(0)[0])
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_round_trip);
criterion_main!(benches);
