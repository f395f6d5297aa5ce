use crate::app::{Echo, PingReport, Pinger, PingerOpts, Receiver};
use crate::net::{NetWorld, PathConfig, Propagation};
use crate::sim::{Scheduler, SimTime, Simulator};

fn ping_pong(pong_loss: f64, opts: PingerOpts) -> (PingReport, Simulator, NetWorld) {
    let mut sim = Simulator::default();
    let mut world = NetWorld::with_seed(3);
    let net = &mut world.net;
    let a = net.add_node(&mut sim, "a");
    let b = net.add_node(&mut sim, "b");
    let delay = PathConfig {
        propagation: Propagation::constant(SimTime::from_millis(5)),
        ..PathConfig::default()
    };
    net.connect(&sim, a, b, delay.clone()).expect("a->b");
    net.connect(
        &sim,
        b,
        a,
        PathConfig {
            loss_rate: pong_loss,
            ..delay
        },
    )
    .expect("b->a");

    sim.start(Box::new(Receiver::new(net, b, Echo)));
    let pinger = Pinger::new(a, b, opts);
    let report = pinger.report_handle();
    sim.start(Box::new(pinger));
    sim.run(&mut world);

    let report = report.lock().expect("ping lock").clone();
    (report, sim, world)
}

#[test]
fn pinger_measures_round_trip_time() {
    let opts = PingerOpts {
        count: 3,
        interval: SimTime::from_millis(10),
        timeout: SimTime::from_millis(100),
        ..PingerOpts::default()
    };
    let (report, sim, world) = ping_pong(0.0, opts);

    assert_eq!(report.sent, 3);
    assert_eq!(report.received, 3);
    assert_eq!(report.timeouts, 0);
    assert_eq!(report.rtts_ns, vec![SimTime::from_millis(10).0; 3]);
    // 取消定时器不会通知事件调度进程：它仍在最后一个超时时刻（40ms + 100ms）醒来一次
    assert_eq!(sim.now(), SimTime::from_millis(140));
    // 超时定时器都被取消了
    assert_eq!(world.net.stats.expired_events, 0);
    assert_eq!(world.net.stats.dispatched_events, 3 * 4);
}

#[test]
fn pinger_times_out_when_pongs_are_lost() {
    let opts = PingerOpts {
        count: 2,
        timeout: SimTime::from_millis(100),
        ..PingerOpts::default()
    };
    let (report, sim, world) = ping_pong(1.0, opts);

    assert_eq!(report.sent, 2);
    assert_eq!(report.received, 0);
    assert_eq!(report.timeouts, 2);
    assert!(report.rtts_ns.is_empty());
    assert_eq!(sim.now(), SimTime::from_millis(200));
    assert_eq!(world.net.stats.lost_pkts, 2);
}
