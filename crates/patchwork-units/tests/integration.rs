//! Integration tests for patchwork-units.
//!
//! Renders each composite inside a full graph: follower step response,
//! ping-pong echo timing, parameter driving under the connection discipline,
//! and idempotent disposal.

use patchwork_core::{Context, Graph, Inlet, Outlet, ParamId, TimeValue};
use patchwork_units::{
    Follower, FollowerOptions, GreaterThan, GreaterThanOptions, GreaterThanZero, ParamSource,
    PingPongDelay, PingPongOptions, Signal, StereoFeedbackEffect, Unit, UnitError, UnitsConfig,
};

const SAMPLE_RATE: f32 = 48000.0;

fn graph() -> Graph {
    Graph::new(Context::new(SAMPLE_RATE, 128))
}

/// Graph with a follower between channel 0 in and out.
fn follower_graph(options: FollowerOptions) -> (Graph, Follower) {
    let mut g = graph();
    let input = g.add_input(0);
    let output = g.add_output(0);
    let follower = Follower::new(&mut g, options).unwrap();
    g.connect(Outlet::of(input), follower.input(0).unwrap())
        .unwrap();
    follower
        .connect(&mut g, 0, Inlet::input(output, 0))
        .unwrap();
    (g, follower)
}

fn render(g: &mut Graph, input: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; input.len()];
    g.process_block(&[input], &mut [&mut out]);
    out
}

// ============================================================================
// 1. Envelope follower
// ============================================================================

#[test]
fn follower_attack_reaches_target_within_attack_time() {
    let (mut g, _f) = follower_graph(FollowerOptions::default());
    let out = render(&mut g, &vec![1.0; 4800]);

    // 50 ms attack: well short of the target after 5 ms, most of the way
    // there after 50 ms.
    assert!(out[240] < 0.63, "at 5 ms: {}", out[240]);
    assert!(out[2400] > 0.63, "at 50 ms: {}", out[2400]);
    assert!(out.iter().all(|x| x.is_finite() && *x <= 1.0 + 1e-3));
}

#[test]
fn follower_release_is_slower_than_attack() {
    let (mut g, _f) = follower_graph(FollowerOptions::default());
    render(&mut g, &vec![1.0; 48000]);
    let out = render(&mut g, &vec![0.0; 24001]);

    // 500 ms release: still high after 50 ms, mostly gone after 500 ms.
    assert!(out[2400] > 0.37, "at 50 ms: {}", out[2400]);
    assert!(out[24000] < 0.37, "at 500 ms: {}", out[24000]);
}

#[test]
fn follower_tracks_negative_input() {
    let (mut g, _f) = follower_graph(FollowerOptions::default());
    let out = render(&mut g, &vec![-0.5; 9600]);
    assert!((out[9599] - 0.5).abs() < 0.01, "{}", out[9599]);
}

#[test]
fn follower_setters_keep_topology() {
    let (mut g, mut f) = follower_graph(FollowerOptions::default());
    let nodes = g.node_count();
    let edges = g.edge_count();

    f.set_attack(&mut g, TimeValue::Milliseconds(1.0)).unwrap();
    f.set_release(&mut g, TimeValue::Milliseconds(20.0))
        .unwrap();
    assert_eq!(g.node_count(), nodes);
    assert_eq!(g.edge_count(), edges);

    // Faster attack now: nearly there after 10 ms.
    let out = render(&mut g, &vec![1.0; 480]);
    assert!(out[479] > 0.9, "{}", out[479]);

    f.dispose(&mut g).unwrap();
    f.dispose(&mut g).unwrap();
    // Only the engine's input and output remain.
    assert_eq!(g.node_count(), 2);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn follower_near_quantum_times_stay_finite() {
    let (mut g, _f) = follower_graph(FollowerOptions {
        attack: TimeValue::Seconds(0.0),
        release: TimeValue::Samples(0.5),
    });
    let input: Vec<f32> = (0..4800).map(|i| if i % 200 < 100 { 1.0 } else { 0.0 }).collect();
    let out = render(&mut g, &input);
    assert!(out.iter().all(|x| x.is_finite()));
}

#[test]
fn follower_drives_a_parameter() {
    let mut g = graph();
    let input = g.add_input(0);
    let carrier = g.add_constant(1.0);
    let vca = g.add_gain(0.7);
    let output = g.add_output(0);
    let follower = Follower::new(&mut g, FollowerOptions::default()).unwrap();
    g.connect(Outlet::of(input), follower.input(0).unwrap())
        .unwrap();
    g.connect(Outlet::of(carrier), Inlet::input(vca, 0))
        .unwrap();
    g.connect(Outlet::of(vca), Inlet::input(output, 0))
        .unwrap();
    follower.drive(&mut g, ParamId::gain(vca)).unwrap();

    // The VCA's own 0.7 is gone; only the envelope remains.
    assert_eq!(g.param(ParamId::gain(vca)).unwrap().value(), 0.0);
    let out = render(&mut g, &vec![0.0; 64]);
    assert!(out.iter().all(|&x| x == 0.0));
}

// ============================================================================
// 2. Comparators
// ============================================================================

#[test]
fn comparator_threshold_from_signal() {
    let mut g = graph();
    let input = g.add_input(0);
    let output = g.add_output(0);
    let gt = GreaterThan::new(&mut g, GreaterThanOptions { value: 10.0 }).unwrap();
    let level = Signal::new(&mut g, 0.5);
    g.connect(Outlet::of(input), gt.input(0).unwrap()).unwrap();
    level.connect(&mut g, 0, gt.input(1).unwrap()).unwrap();
    gt.connect(&mut g, 0, Inlet::input(output, 0)).unwrap();

    assert_eq!(render(&mut g, &[0.4, 0.5, 0.6]), vec![0.0, 0.0, 1.0]);
    level.set_value(&mut g, 0.55).unwrap();
    assert_eq!(render(&mut g, &[0.5, 0.6]), vec![0.0, 1.0]);
}

#[test]
fn gate_gain_from_comparator() {
    let mut g = graph();
    let input = g.add_input(0);
    let vca = g.add_gain(0.3);
    let output = g.add_output(0);
    let gtz = GreaterThanZero::new(&mut g).unwrap();
    g.connect(Outlet::of(input), gtz.input(0).unwrap()).unwrap();
    g.connect(Outlet::of(input), Inlet::input(vca, 0)).unwrap();
    g.connect(Outlet::of(vca), Inlet::input(output, 0)).unwrap();
    gtz.drive(&mut g, ParamId::gain(vca)).unwrap();

    // Negative half is muted, positive half passes at unity.
    assert_eq!(
        render(&mut g, &[-0.5, 0.25, -1.0, 0.75]),
        vec![0.0, 0.25, 0.0, 0.75]
    );
}

// ============================================================================
// 3. Ping-pong delay
// ============================================================================

const ECHO_FRAMES: usize = 480;

fn ping_pong_graph(options: PingPongOptions) -> (Graph, PingPongDelay) {
    let mut g = graph();
    let in_l = g.add_input(0);
    let in_r = g.add_input(1);
    let out_l = g.add_output(0);
    let out_r = g.add_output(1);
    let pp = PingPongDelay::new(&mut g, options).unwrap();
    g.connect(Outlet::of(in_l), pp.input(0).unwrap()).unwrap();
    g.connect(Outlet::of(in_r), pp.input(1).unwrap()).unwrap();
    pp.connect(&mut g, 0, Inlet::input(out_l, 0)).unwrap();
    pp.connect(&mut g, 1, Inlet::input(out_r, 0)).unwrap();
    (g, pp)
}

fn render_stereo(g: &mut Graph, l: &[f32], r: &[f32]) -> (Vec<f32>, Vec<f32>) {
    let mut out_l = vec![0.0; l.len()];
    let mut out_r = vec![0.0; r.len()];
    g.process_block(&[l, r], &mut [&mut out_l, &mut out_r]);
    (out_l, out_r)
}

fn impulse(len: usize) -> Vec<f32> {
    let mut x = vec![0.0; len];
    x[0] = 1.0;
    x
}

fn wet_ping_pong() -> PingPongOptions {
    PingPongOptions {
        delay_time: TimeValue::Samples(ECHO_FRAMES as f32),
        wet: 1.0,
        feedback: 0.25,
        ..Default::default()
    }
}

#[test]
fn left_impulse_echoes_left_then_right() {
    let (mut g, _pp) = ping_pong_graph(wet_ping_pong());
    let len = 4 * ECHO_FRAMES;
    let (l, r) = render_stereo(&mut g, &impulse(len), &vec![0.0; len]);

    assert!((l[ECHO_FRAMES] - 1.0).abs() < 1e-3, "{}", l[ECHO_FRAMES]);
    assert!(r[ECHO_FRAMES].abs() < 1e-6);
    assert!((r[2 * ECHO_FRAMES] - 0.25).abs() < 1e-3, "{}", r[2 * ECHO_FRAMES]);
    assert!(l[2 * ECHO_FRAMES].abs() < 1e-6);
    assert!((l[3 * ECHO_FRAMES] - 0.0625).abs() < 1e-3);

    // Silence before the first echo and between echoes.
    assert!(l[..ECHO_FRAMES - 1].iter().all(|x| x.abs() < 1e-6));
    assert!(r[..2 * ECHO_FRAMES - 1].iter().all(|x| x.abs() < 1e-6));
}

#[test]
fn dry_signal_passes_at_half_wet() {
    let (mut g, _pp) = ping_pong_graph(PingPongOptions {
        delay_time: TimeValue::Samples(ECHO_FRAMES as f32),
        ..Default::default()
    });
    let (l, r) = render_stereo(&mut g, &impulse(ECHO_FRAMES + 1), &vec![0.0; ECHO_FRAMES + 1]);
    assert!((l[0] - 0.5).abs() < 1e-6);
    assert!((l[ECHO_FRAMES] - 0.5).abs() < 1e-3);
    assert!(r.iter().all(|x| x.abs() < 1e-6));
}

#[test]
fn changing_delay_time_moves_both_channels() {
    let (mut g, pp) = ping_pong_graph(wet_ping_pong());
    pp.set_delay_time(&mut g, TimeValue::Samples(240.0)).unwrap();
    let len = 2 * ECHO_FRAMES + 1;
    let (l, r) = render_stereo(&mut g, &impulse(len), &vec![0.0; len]);
    assert!((l[240] - 1.0).abs() < 1e-3);
    assert!((r[480] - 0.25).abs() < 1e-3);
}

#[test]
fn set_delay_time_wins_over_scheduled_automation() {
    let (mut g, pp) = ping_pong_graph(wet_ping_pong());
    g.param_mut(pp.delay_time_param())
        .unwrap()
        .set_value_at_time(50.0 / SAMPLE_RATE, 0.0)
        .unwrap();
    pp.set_delay_time(&mut g, TimeValue::Samples(200.0)).unwrap();
    assert!((pp.delay_time(&g).unwrap() - 200.0 / SAMPLE_RATE).abs() < 1e-7);

    let len = 2 * ECHO_FRAMES;
    let (l, _r) = render_stereo(&mut g, &impulse(len), &vec![0.0; len]);
    assert!(l[50].abs() < 1e-6, "{}", l[50]);
    assert!((l[200] - 1.0).abs() < 1e-3, "{}", l[200]);
    assert!((pp.delay_time(&g).unwrap() - 200.0 / SAMPLE_RATE).abs() < 1e-7);
}

#[test]
fn delay_time_getter_reports_automated_value() {
    let (mut g, pp) = ping_pong_graph(wet_ping_pong());
    g.param_mut(pp.delay_time_param())
        .unwrap()
        .set_value_at_time(100.0 / SAMPLE_RATE, 0.0)
        .unwrap();
    assert!((pp.delay_time(&g).unwrap() - 100.0 / SAMPLE_RATE).abs() < 1e-7);
}

#[test]
fn delay_time_beyond_max_is_a_range_error() {
    let (mut g, pp) = ping_pong_graph(PingPongOptions {
        max_delay_time: 0.5,
        ..Default::default()
    });
    let err = pp
        .set_delay_time(&mut g, TimeValue::Seconds(0.75))
        .unwrap_err();
    assert!(matches!(err, UnitError::Graph(_)), "{err}");
    assert_eq!(pp.delay_time(&g).unwrap(), 0.25);
}

#[test]
fn feedback_decays() {
    let (mut g, _pp) = ping_pong_graph(PingPongOptions {
        delay_time: TimeValue::Samples(48.0),
        feedback: 0.9,
        wet: 1.0,
        ..Default::default()
    });
    let (l, r) = render_stereo(&mut g, &impulse(48000), &vec![0.0; 48000]);
    let tail = l[47000..].iter().chain(&r[47000..]).fold(0.0f32, |m, x| m.max(x.abs()));
    assert!(tail < 1e-3, "tail {tail}");
}

// ============================================================================
// 4. Disposal and configuration
// ============================================================================

#[test]
fn every_composite_disposes_twice() {
    let mut g = graph();
    let mut units: Vec<Box<dyn Unit>> = vec![
        Box::new(Signal::new(&mut g, 1.0)),
        Box::new(GreaterThanZero::new(&mut g).unwrap()),
        Box::new(GreaterThan::new(&mut g, GreaterThanOptions::default()).unwrap()),
        Box::new(Follower::new(&mut g, FollowerOptions::default()).unwrap()),
        Box::new(StereoFeedbackEffect::new(&mut g, 0.5, 0.5).unwrap()),
        Box::new(PingPongDelay::new(&mut g, PingPongOptions::default()).unwrap()),
    ];
    for unit in &mut units {
        unit.dispose(&mut g).unwrap();
        unit.dispose(&mut g).unwrap();
        assert!(unit.is_disposed(), "{}", unit.name());
        assert!(matches!(unit.output(0), Err(UnitError::Disposed(_))));
    }
    assert_eq!(g.node_count(), 0);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn disposing_one_unit_leaves_neighbours_wired() {
    let (mut g, mut f) = follower_graph(FollowerOptions::default());
    let gt = GreaterThan::new(&mut g, GreaterThanOptions { value: 0.1 }).unwrap();
    f.connect(&mut g, 0, gt.input(0).unwrap()).unwrap();
    f.dispose(&mut g).unwrap();
    assert!(gt.output(0).is_ok());
    assert_eq!(gt.value(&g).unwrap(), 0.1);
}

#[test]
fn units_built_from_config() {
    let config = UnitsConfig::from_toml_str(
        r#"
        [engine]
        sample_rate = 44100.0
        bpm = 90.0

        [follower]
        attack = { milliseconds = 10.0 }

        [ping_pong]
        delay_time = { note = "eighth" }
        feedback = 0.4
        "#,
    )
    .unwrap();
    let mut g = Graph::new(config.engine.context());
    let f = Follower::new(&mut g, config.follower_options()).unwrap();
    let pp = PingPongDelay::new(&mut g, config.ping_pong_options()).unwrap();

    assert!((f.map(&g).attack_hz - 100.0).abs() < 1e-3);
    // An eighth at 90 BPM is a third of a second.
    assert!((pp.delay_time(&g).unwrap() - 1.0 / 3.0).abs() < 1e-6);
    assert!((pp.feedback(&g).unwrap() - 0.4).abs() < 1e-7);
}
