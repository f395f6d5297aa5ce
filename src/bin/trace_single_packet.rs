//! 单包追踪模式
//!
//! 只发送一个数据包，打印详细的执行流程和每一次队列转移

use clap::Parser;
use netsim_rs::net::{Bandwidth, NetWorld, PathConfig, Propagation};
use netsim_rs::sim::{SimTime, Simulator};
use netsim_rs::trace::TraceRecorder;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "trace-single-packet", about = "单包追踪模式：只发送一个数据包，打印详细的执行流程")]
struct Args {
    #[arg(long, default_value_t = 1500)]
    pkt_bytes: u32,
    /// 路径带宽（字节/秒）
    #[arg(long, default_value_t = 1_250_000_000)]
    bandwidth: u64,
    /// 传播时延（微秒）
    #[arg(long, default_value_t = 2)]
    latency_us: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化 tracing
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
    let mut world = NetWorld::default();
    let recorder = TraceRecorder::new();
    world.net.set_tracer(recorder.clone());

    info!("╔════════════════════════════════════════════════════════════════════════════════╗");
    info!("║                    单包追踪模式启动                                            ║");
    info!("╚════════════════════════════════════════════════════════════════════════════════╝");

    let net = &mut world.net;
    let src = net.add_node(&mut sim, "src");
    let dst = net.add_node(&mut sim, "dst");
    let config = PathConfig {
        bandwidth: Bandwidth::BytesPerSec(args.bandwidth),
        propagation: Propagation::constant(SimTime::from_micros(args.latency_us)),
        ..PathConfig::default()
    };
    net.connect(&sim, src, dst, config)?;
    debug!(tx_time = ?net.path(net.path_between(src, dst).expect("just connected")).tx_time(args.pkt_bytes), "路径信息");

    info!("在 t=0 把数据包放进发送队列");
    net.send(&mut sim, src, dst, 0, args.pkt_bytes, None)?;

    info!("开始运行仿真直到所有事件完成");
    sim.run(&mut world);

    info!("╔════════════════════════════════════════════════════════════════════════════════╗");
    info!("║                    仿真完成                                                    ║");
    info!("╚════════════════════════════════════════════════════════════════════════════════╝");

    for ev in recorder.take() {
        println!("{}", serde_json::to_string(&ev)?);
    }
    println!(
        "done @ {:?}, delivered_pkts={}, delivered_bytes={}",
        sim.now(),
        world.net.stats.delivered_pkts,
        world.net.stats.delivered_bytes
    );
    Ok(())
}
