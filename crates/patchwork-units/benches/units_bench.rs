//! Criterion benchmarks for the composite units.
//!
//! Each composite is rendered inside a graph at several block sizes.
//!
//! Run with: `cargo bench -p patchwork-units`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchwork_core::{Context, Graph, Inlet, Outlet, TimeValue};
use patchwork_units::{
    Follower, FollowerOptions, GreaterThan, GreaterThanOptions, PingPongDelay, PingPongOptions,
    Unit,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

/// Wires `unit` between engine channels; stereo units get both channels.
fn wire<U: Unit>(graph: &mut Graph, unit: &U) {
    for channel in 0..unit.inputs() {
        let input = graph.add_input(channel);
        graph
            .connect(Outlet::of(input), unit.input(channel).unwrap())
            .unwrap();
    }
    for channel in 0..unit.outputs() {
        let output = graph.add_output(channel);
        unit.connect(graph, channel, Inlet::input(output, 0))
            .unwrap();
    }
}

fn bench_graph(c: &mut Criterion, name: &str, mut graph: Graph, channels: usize) {
    let mut group = c.benchmark_group(name);
    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut left = vec![0.0; block_size];
                let mut right = vec![0.0; block_size];
                b.iter(|| {
                    if channels == 2 {
                        graph.process_block(
                            &[black_box(input.as_slice()), black_box(input.as_slice())],
                            &mut [&mut left, &mut right],
                        );
                    } else {
                        graph.process_block(&[black_box(input.as_slice())], &mut [&mut left]);
                    }
                    black_box(left[0])
                })
            },
        );
    }
    group.finish();
}

fn bench_follower(c: &mut Criterion) {
    let mut graph = Graph::new(Context::new(SAMPLE_RATE, 256));
    let follower = Follower::new(
        &mut graph,
        FollowerOptions {
            attack: TimeValue::Milliseconds(5.0),
            release: TimeValue::Milliseconds(50.0),
        },
    )
    .unwrap();
    wire(&mut graph, &follower);
    bench_graph(c, "Follower", graph, 1);
}

fn bench_greater_than(c: &mut Criterion) {
    let mut graph = Graph::new(Context::new(SAMPLE_RATE, 256));
    let gt = GreaterThan::new(&mut graph, GreaterThanOptions { value: 0.25 }).unwrap();
    wire(&mut graph, &gt);
    bench_graph(c, "GreaterThan", graph, 1);
}

fn bench_ping_pong(c: &mut Criterion) {
    let mut graph = Graph::new(Context::new(SAMPLE_RATE, 256));
    let delay = PingPongDelay::new(&mut graph, PingPongOptions::default()).unwrap();
    wire(&mut graph, &delay);
    bench_graph(c, "PingPongDelay", graph, 2);
}

fn bench_construct(c: &mut Criterion) {
    c.bench_function("construct/ping_pong_dispose", |b| {
        b.iter(|| {
            let mut graph = Graph::new(Context::new(SAMPLE_RATE, 256));
            let mut delay = PingPongDelay::new(&mut graph, PingPongOptions::default()).unwrap();
            delay.dispose(&mut graph).unwrap();
            black_box(graph.node_count())
        })
    });
}

criterion_group!(
    benches,
    bench_follower,
    bench_greater_than,
    bench_ping_pong,
    bench_construct
);
criterion_main!(benches);
