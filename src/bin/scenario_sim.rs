use clap::Parser;
use netsim_rs::net::NetWorld;
use netsim_rs::sim::{SimTime, Simulator};
use netsim_rs::topo::scenario::{ScenarioSpec, build_scenario};
use netsim_rs::trace::TraceRecorder;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "scenario-sim", about = "Run a scenario.json on the netsim-rs core")]
struct Args {
    /// Path to scenario.json
    #[arg(long)]
    scenario: PathBuf,

    /// Output packet trace JSON file
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// Output summary JSON file (stats and per-sink reports)
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Run until this time (ms); overrides the scenario's until_ms
    #[arg(long)]
    until_ms: Option<f64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let raw = fs::read_to_string(&args.scenario)?;
    let mut spec = ScenarioSpec::from_json(&raw)?;
    if let Some(seed) = args.seed {
        spec.seed = seed;
    }
    let until = args
        .until_ms
        .map(|ms| SimTime::from_secs_f64(ms / 1e3))
        .or_else(|| spec.until());

    let mut sim = Simulator::default();
    let mut world = NetWorld::with_seed(spec.seed);
    let recorder = TraceRecorder::new();
    if args.trace_json.is_some() {
        world.net.set_tracer(recorder.clone());
    }

    let scenario = build_scenario(&spec, &mut sim, &mut world.net)?;
    match until {
        Some(until) => sim.run_until(until, &mut world),
        None => sim.run(&mut world),
    }

    let stats = &world.net.stats;
    println!(
        "done @ {:?}, sent_pkts={}, delivered_pkts={}, delivered_bytes={}, lost_pkts={}, drops={}",
        sim.now(),
        stats.sent_pkts,
        stats.delivered_pkts,
        stats.delivered_bytes,
        stats.lost_pkts,
        stats.sender_drops + stats.receive_drops,
    );
    let sinks: BTreeMap<_, _> = scenario
        .sinks
        .iter()
        .map(|(name, sink)| (name.clone(), sink.report()))
        .collect();
    for (name, report) in &sinks {
        println!("sink {name} pkts={} bytes={}", report.pkts, report.bytes);
    }

    if let Some(path) = args.trace_json {
        let events = recorder.take();
        info!(events = events.len(), path = %path.display(), "写出 trace");
        fs::write(&path, serde_json::to_string_pretty(&events)?)?;
    }
    if let Some(path) = args.summary_json {
        let summary = serde_json::json!({
            "now_ns": sim.now().0,
            "cohorts": sim.cohorts(),
            "stats": stats,
            "sinks": sinks,
        });
        fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}
