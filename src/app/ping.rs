//! ping / echo
//!
//! `Pinger` 逐个发送 ping，每个 ping 等待对应的 pong 或超时后才发下一个。
//! 超时由一个用户定时器唤醒；收到 pong 时取消该定时器。

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::receiver::{PacketHandler, WakeProcess};
use crate::net::{NetWorld, Network, NodeId, Packet, TimerId};
use crate::sim::{Context, Process, SimTime, Terminated, World, Yield};
use tracing::{debug, info, warn};

pub const PING: u32 = 1;
pub const PONG: u32 = 2;

/// 把收到的 ping 原样作为 pong 发回
#[derive(Debug, Default, Clone, Copy)]
pub struct Echo;

impl PacketHandler for Echo {
    fn on_packet(&mut self, net: &mut Network, cx: &mut Context<'_>, node: NodeId, pkt: Packet) {
        if pkt.kind != PING {
            return;
        }
        if let Err(e) = net.send(cx, node, pkt.source, PONG, pkt.size_bytes, pkt.payload) {
            warn!(node = ?node, error = %e, "回送 pong 失败");
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PingReport {
    pub sent: u64,
    pub received: u64,
    pub timeouts: u64,
    pub rtts_ns: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct PingerOpts {
    pub count: u64,
    pub size_bytes: u32,
    /// 收到 pong（或超时）之后隔多久发下一个
    pub interval: SimTime,
    pub timeout: SimTime,
}

impl Default for PingerOpts {
    fn default() -> Self {
        Self {
            count: 4,
            size_bytes: 64,
            interval: SimTime::from_millis(10),
            timeout: SimTime::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PingState {
    Idle,
    Waiting {
        seq: u64,
        sent_at: SimTime,
        deadline: SimTime,
        timer: TimerId,
    },
}

pub struct Pinger {
    node: NodeId,
    peer: NodeId,
    opts: PingerOpts,
    next_seq: u64,
    state: PingState,
    report: Arc<Mutex<PingReport>>,
}

impl Pinger {
    pub fn new(node: NodeId, peer: NodeId, opts: PingerOpts) -> Self {
        Self {
            node,
            peer,
            opts,
            next_seq: 0,
            state: PingState::Idle,
            report: Arc::default(),
        }
    }

    /// 共享的报告；进程结束后仍可读取
    pub fn report_handle(&self) -> Arc<Mutex<PingReport>> {
        Arc::clone(&self.report)
    }

    fn ping_seq(pkt: &Packet) -> Option<u64> {
        let bytes = pkt.payload.as_deref()?.get(..8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }
}

impl Process for Pinger {
    fn name(&self) -> &str {
        "pinger"
    }

    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated> {
        let net = NetWorld::net_mut(world);
        loop {
            cx.check_terminated()?;
            let now = cx.now();
            match self.state {
                PingState::Idle => {
                    if self.next_seq == self.opts.count {
                        info!(report = ?self.report.lock().expect("ping lock"), "🏁 ping 结束");
                        return Ok(Yield::Finished);
                    }
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    let payload = seq.to_le_bytes().to_vec();
                    let sent = net.send(cx, self.node, self.peer, PING, self.opts.size_bytes, Some(payload));
                    if let Err(e) = sent {
                        warn!(seq, error = %e, "ping 发送失败");
                    }
                    self.report.lock().expect("ping lock").sent += 1;
                    let wake = WakeProcess(cx.pid());
                    let timer = net.schedule_user_timer(
                        cx,
                        self.node,
                        self.opts.timeout,
                        Box::new(wake),
                        Box::new(seq),
                    );
                    self.state = PingState::Waiting {
                        seq,
                        sent_at: now,
                        deadline: now.saturating_add(self.opts.timeout),
                        timer,
                    };
                }
                PingState::Waiting {
                    seq,
                    sent_at,
                    deadline,
                    timer,
                } => match net.receive(cx, self.node) {
                    Some(pkt) if pkt.kind == PONG && Self::ping_seq(&pkt) == Some(seq) => {
                        net.cancel_user_timer(timer);
                        let rtt = now.saturating_sub(sent_at);
                        debug!(seq, rtt = ?rtt, "收到 pong");
                        let mut r = self.report.lock().expect("ping lock");
                        r.received += 1;
                        r.rtts_ns.push(rtt.0);
                        drop(r);
                        self.state = PingState::Idle;
                        if self.opts.interval > SimTime::ZERO {
                            return Ok(Yield::BlockFor(self.opts.interval));
                        }
                    }
                    Some(pkt) => {
                        debug!(seq = pkt.seq, kind = pkt.kind, "丢弃过期或无关的包");
                    }
                    None if now >= deadline => {
                        net.unregister_receive_waiter(self.node, cx.pid());
                        debug!(seq, "ping 超时");
                        self.report.lock().expect("ping lock").timeouts += 1;
                        self.state = PingState::Idle;
                    }
                    None => return Ok(Yield::BlockIndefinitely),
                },
            }
        }
    }
}
