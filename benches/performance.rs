// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for stepseq
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Tick processing with grids of varying density
//! - Next-empty-step scans used by recording
//! - Key press handling while recording

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stepseq::audio::ToneEmitter;
use stepseq::music::PitchTable;
use stepseq::sequencer::{Command, ManualScheduler, SequencerEngine, StepGrid, NUM_STEPS, NUM_TRACKS};
use stepseq::timing::StepClock;

/// Emitter that discards tones
struct NullEmitter;

impl ToneEmitter for NullEmitter {
    fn emit(&mut self, frequency_hz: f64, _duration: std::time::Duration, volume: f32) {
        black_box((frequency_hz, volume));
    }
}

/// Engine with every `stride`-th cell filled
fn running_engine(stride: usize) -> SequencerEngine<ManualScheduler, NullEmitter> {
    let mut engine = SequencerEngine::new(ManualScheduler::new(), NullEmitter);
    for track in 0..NUM_TRACKS {
        for step in (0..NUM_STEPS).step_by(stride) {
            engine
                .handle(Command::SetStep {
                    track,
                    step,
                    note: Some("A4".to_string()),
                })
                .expect("valid step");
        }
    }
    engine.handle(Command::Start).expect("start");
    engine
}

/// Benchmark tempo-to-interval conversion
fn bench_step_interval(c: &mut Criterion) {
    c.bench_function("step_interval", |b| {
        b.iter(|| {
            let clock = StepClock::new(black_box(133), NUM_STEPS).ok();
            black_box(clock.map(|c| c.step_interval()))
        })
    });
}

/// Benchmark tick handling (the playback hot path)
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for (label, stride) in [("full", 1), ("quarter", 4), ("sparse", 16)] {
        group.bench_with_input(BenchmarkId::new("density", label), &stride, |b, &stride| {
            let mut engine = running_engine(stride);
            b.iter(|| {
                if let Some(id) = engine.transport().timer() {
                    black_box(engine.handle(Command::Tick(id)).ok());
                }
            })
        });
    }

    group.finish();
}

/// Benchmark next-empty-step scans
fn bench_find_next_empty(c: &mut Criterion) {
    let pitches = Arc::new(PitchTable::standard());
    let mut group = c.benchmark_group("find_next_empty_step");

    for filled in [0, 8, 15, 16] {
        let mut grid = StepGrid::new(Arc::clone(&pitches));
        for step in 0..filled {
            grid.set(0, step, Some("C4")).expect("valid step");
        }
        group.bench_with_input(BenchmarkId::new("filled", filled), &grid, |b, grid| {
            b.iter(|| black_box(grid.find_next_empty_step(black_box(0)).ok()))
        });
    }

    group.finish();
}

/// Benchmark recording a key press
fn bench_record_key(c: &mut Criterion) {
    c.bench_function("record_key_press", |b| {
        let mut engine = SequencerEngine::new(ManualScheduler::new(), NullEmitter);
        engine.handle(Command::SetRecording(true)).expect("record on");
        b.iter(|| {
            // Keep the record track from filling up
            if engine.grid().find_next_empty_step(0).ok().flatten().is_none() {
                engine.handle(Command::ClearTrack(0)).expect("clear record track");
            }
            black_box(engine.handle(Command::key_press("E4")).ok())
        })
    });
}

criterion_group!(
    benches,
    bench_step_interval,
    bench_tick,
    bench_find_next_empty,
    bench_record_key,
);
criterion_main!(benches);
