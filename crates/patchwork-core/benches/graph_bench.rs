//! Criterion benchmarks for the per-sample graph engine (`patchwork-core::graph`).
//!
//! Two axes:
//!
//! - **Compile** - Kahn sort over instantaneous edges and source gathering
//! - **Execute** - `process_block()` throughput at varying block sizes
//!
//! Run with: `cargo bench -p patchwork-core -- graph/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchwork_core::{Context, Graph, Inlet, NodeId, Outlet, ParamId};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 256;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

// ---------------------------------------------------------------------------
// Graph constructors
// ---------------------------------------------------------------------------

fn make_linear(n: usize) -> Graph {
    let mut graph = Graph::new(Context::new(SAMPLE_RATE, BLOCK_SIZE));
    let input = graph.add_input(0);
    let mut prev: NodeId = input;
    for _ in 0..n {
        let node = graph.add_gain(0.9);
        graph.connect(Outlet::of(prev), Inlet::input(node, 0)).unwrap();
        prev = node;
    }
    let output = graph.add_output(0);
    graph.connect(Outlet::of(prev), Inlet::input(output, 0)).unwrap();
    graph
}

/// Delay with feedback whose cutoff-filtered tail is modulated by a constant.
fn make_feedback() -> Graph {
    let mut graph = Graph::new(Context::new(SAMPLE_RATE, BLOCK_SIZE));
    let input = graph.add_input(0);
    let delay = graph.add_delay(0.25, 1.0);
    let lp = graph.add_lowpass(2000.0, 0.707);
    let fb = graph.add_gain(0.5);
    let cutoff = graph.add_constant(1500.0);
    let output = graph.add_output(0);
    graph.connect(Outlet::of(input), Inlet::input(delay, 0)).unwrap();
    graph.connect(Outlet::of(delay), Inlet::input(lp, 0)).unwrap();
    graph.connect(Outlet::of(lp), Inlet::input(fb, 0)).unwrap();
    graph.connect(Outlet::of(fb), Inlet::input(delay, 0)).unwrap();
    graph.connect(Outlet::of(cutoff), ParamId::frequency(lp).into()).unwrap();
    graph.connect(Outlet::of(delay), Inlet::input(output, 0)).unwrap();
    graph
}

// ---------------------------------------------------------------------------
// Compile benchmarks
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/compile");

    group.bench_function("linear_5", |b| {
        b.iter(|| {
            let mut graph = make_linear(5);
            black_box(graph.compile().unwrap().step_count());
        });
    });

    group.bench_function("linear_20", |b| {
        b.iter(|| {
            let mut graph = make_linear(20);
            black_box(graph.compile().unwrap().step_count());
        });
    });

    group.bench_function("feedback", |b| {
        b.iter(|| {
            let mut graph = make_feedback();
            black_box(graph.compile().unwrap().step_count());
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Execute benchmarks
// ---------------------------------------------------------------------------

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/execute");

    let input = vec![0.5f32; BLOCK_SIZE];
    let mut out = vec![0.0f32; BLOCK_SIZE];

    {
        let mut graph = make_linear(5);
        group.bench_function("linear_5_block256", |b| {
            b.iter(|| {
                graph.process_block(&[black_box(&input)], &mut [&mut out]);
                black_box(&out);
            });
        });
    }

    {
        let mut graph = make_feedback();
        group.bench_function("feedback_block256", |b| {
            b.iter(|| {
                graph.process_block(&[black_box(&input)], &mut [&mut out]);
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn bench_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/block_size");

    for &size in BLOCK_SIZES {
        let mut graph = make_feedback();
        let input = vec![0.5f32; size];
        let mut out = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                graph.process_block(&[black_box(&input)], &mut [&mut out]);
                black_box(&out);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_execute, bench_block_sizes);
criterion_main!(benches);
