//! Envelope demo: a tone burst through the follower, gated by a comparator.
//!
//! Run with: RUST_LOG=debug cargo run -p patchwork-units --example envelope_demo --features tracing

use patchwork_core::{Graph, Inlet, Outlet};
use patchwork_units::{Follower, GreaterThan, Unit, UnitsConfig};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
[engine]
sample_rate = 48000.0

[follower]
attack = { milliseconds = 10.0 }
release = { milliseconds = 100.0 }

[greater_than]
value = 0.25
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = UnitsConfig::from_toml_str(CONFIG)?;
    let ctx = config.engine.context();
    let mut graph = Graph::new(ctx);

    let input = graph.add_input(0);
    let env_out = graph.add_output(0);
    let gate_out = graph.add_output(1);
    let mut follower = Follower::new(&mut graph, config.follower_options())?;
    let mut gate = GreaterThan::new(&mut graph, config.greater_than_options())?;

    graph.connect(Outlet::of(input), follower.input(0)?)?;
    follower.connect(&mut graph, 0, Inlet::input(env_out, 0))?;
    follower.connect(&mut graph, 0, gate.input(0)?)?;
    gate.connect(&mut graph, 0, Inlet::input(gate_out, 0))?;

    // 200 ms of 440 Hz, then 300 ms of silence.
    let sr = ctx.sample_rate();
    let burst: Vec<f32> = (0..(sr * 0.5) as usize)
        .map(|i| {
            let t = i as f32 / sr;
            if t < 0.2 {
                (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.8
            } else {
                0.0
            }
        })
        .collect();

    let mut envelope = vec![0.0; burst.len()];
    let mut gated = vec![0.0; burst.len()];
    graph.process_block(&[&burst], &mut [&mut envelope, &mut gated]);

    tracing::info!(
        attack_s = follower.attack_seconds(&graph),
        release_s = follower.release_seconds(&graph),
        "follower ready"
    );

    println!("{:>8} {:>10} {:>6}", "ms", "envelope", "gate");
    println!("{:->8} {:->10} {:->6}", "", "", "");
    let step = (sr * 0.025) as usize;
    for i in (0..burst.len()).step_by(step) {
        println!(
            "{:>8.1} {:>10.4} {:>6}",
            i as f32 * 1000.0 / sr,
            envelope[i],
            gated[i]
        );
    }

    follower.dispose(&mut graph)?;
    gate.dispose(&mut graph)?;
    tracing::info!(nodes = graph.node_count(), "units disposed");
    Ok(())
}
