//! ping-pong：两个节点，一端 ping，另一端 echo

use clap::Parser;
use netsim_rs::app::{Echo, Pinger, PingerOpts, Receiver};
use netsim_rs::net::{Bandwidth, NetWorld, PathConfig, Propagation};
use netsim_rs::sim::{Scheduler, SimTime, Simulator};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ping-pong", about = "两个节点之间的 ping/echo")]
struct Args {
    #[arg(long, default_value_t = 10)]
    count: u64,
    #[arg(long, default_value_t = 64)]
    size_bytes: u32,
    /// 路径带宽（字节/秒），0 表示不限速
    #[arg(long, default_value_t = 125_000)]
    bandwidth: u64,
    /// 单向传播时延（毫秒）
    #[arg(long, default_value_t = 5.0)]
    delay_ms: f64,
    #[arg(long, default_value_t = 0.0)]
    loss_rate: f64,
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,
    #[arg(long, default_value_t = 1)]
    seed: u64,
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
    let mut sim = Simulator::default();
    let mut world = NetWorld::with_seed(args.seed);
    let net = &mut world.net;

    let a = net.add_node(&mut sim, "a");
    let b = net.add_node(&mut sim, "b");
    let config = PathConfig {
        bandwidth: match args.bandwidth {
            0 => Bandwidth::Unlimited,
            bps => Bandwidth::BytesPerSec(bps),
        },
        loss_rate: args.loss_rate,
        propagation: Propagation::Constant {
            secs: args.delay_ms / 1e3,
        },
        ..PathConfig::default()
    };
    net.connect(&sim, a, b, config.clone())?;
    net.connect(&sim, b, a, config)?;

    sim.start(Box::new(Receiver::new(net, b, Echo)));
    let pinger = Pinger::new(
        a,
        b,
        PingerOpts {
            count: args.count,
            size_bytes: args.size_bytes,
            timeout: SimTime::from_millis(args.timeout_ms),
            ..PingerOpts::default()
        },
    );
    let report = pinger.report_handle();
    sim.start(Box::new(pinger));

    sim.run(&mut world);

    let report = report.lock().expect("ping lock").clone();
    info!(sent = report.sent, received = report.received, timeouts = report.timeouts, "ping 统计");
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
