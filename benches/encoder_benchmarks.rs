// Anim64 - Delta-compressed animation scripts for C64 playback engines
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Performance benchmarks for the Anim64 compiler.
//!
//! Run with: cargo bench
//!
//! Results are saved to target/criterion/ with HTML reports.

use anim64::{build, recording, Bin, DeltaEncoder, EncoderConfig, LayoutMode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Benchmark Inputs
// ============================================================================

/// Frames of `objects` objects circling, with pauses and jumps.
fn frames(objects: usize, length: usize) -> Vec<(usize, [i32; 3])> {
    let mut out = Vec::with_capacity(objects * length);
    for frame in 0..length as i32 {
        for object in 0..objects as i32 {
            let phase = frame + object * 17;
            let x = match phase % 50 {
                0..=19 => 24 + phase % 20,
                20..=29 => 44,
                _ => 300 - (phase % 50) * 3,
            };
            let y = 50 + (phase / 4) % 150;
            let angle = (phase / 3) % 32;
            out.push((object as usize, [x, y, angle]));
        }
    }
    out
}

fn recording_text(objects: usize, length: usize) -> String {
    frames(objects, length)
        .iter()
        .map(|(object, [x, y, angle])| format!("{} {} {} {}\n", object, x, y, angle))
        .collect()
}

fn recorded(objects: usize, length: usize) -> DeltaEncoder {
    let mut encoder = DeltaEncoder::new(objects, EncoderConfig::new(3)).unwrap();
    for (object, state) in frames(objects, length) {
        encoder.record(object, &state).unwrap();
    }
    encoder
}

// ============================================================================
// Recording Benchmarks
// ============================================================================

fn bench_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording");

    for (name, objects, length) in [("small", 2, 100), ("medium", 8, 500), ("large", 16, 2000)] {
        let text = recording_text(objects, length);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), &text, |b, src| {
            b.iter(|| recording::parse(black_box(src)))
        });
    }

    group.finish();
}

// ============================================================================
// Encoder Benchmarks
// ============================================================================

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoder");

    for (name, objects, length) in [("small", 2, 100), ("medium", 8, 500), ("large", 16, 2000)] {
        let input = frames(objects, length);
        group.throughput(Throughput::Elements(input.len() as u64));

        group.bench_with_input(BenchmarkId::new("record_freeze", name), &input, |b, input| {
            b.iter(|| {
                let mut encoder = DeltaEncoder::new(objects, EncoderConfig::new(3)).unwrap();
                for (object, state) in input {
                    encoder.record(*object, state).unwrap();
                }
                encoder.freeze()
            })
        });

        let frozen = recorded(objects, length).freeze();
        group.bench_with_input(BenchmarkId::new("compile_all", name), &frozen, |b, frozen| {
            b.iter(|| black_box(frozen).compile_all())
        });
    }

    group.finish();
}

// ============================================================================
// Layout Benchmarks
// ============================================================================

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let frozen = recorded(16, 2000).freeze();

    group.bench_function("contiguous", |b| {
        b.iter(|| build(frozen.clone(), black_box(&LayoutMode::Contiguous { base: 0x4000 })))
    });

    let bins = LayoutMode::Chunked {
        bins: vec![
            Bin::from_range(0x0C00, 0x0FFF),
            Bin::from_range(0x2000, 0x3FFF),
            Bin::from_range(0x4000, 0x7FFF),
            Bin::from_range(0xC000, 0xCFFF),
        ],
    };
    group.bench_function("chunked", |b| {
        b.iter(|| build(frozen.clone(), black_box(&bins)))
    });

    group.finish();
}

// ============================================================================
// Scaling Benchmarks
// ============================================================================

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for objects in [1, 4, 16, 64] {
        let input = recording_text(objects, 256);
        group.throughput(Throughput::Elements(objects as u64));
        group.bench_with_input(BenchmarkId::new("objects", objects), &input, |b, src| {
            b.iter(|| {
                anim64::compile_recording(
                    black_box(src),
                    None,
                    EncoderConfig::new(3),
                    &LayoutMode::Contiguous { base: 0x0800 },
                )
            })
        });
    }

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_recording, bench_encoder, bench_layout, bench_scaling);

criterion_main!(benches);
