//! 收包统计

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::receiver::PacketHandler;
use crate::net::{Network, NodeId, Packet};
use crate::sim::Context;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SinkReport {
    pub pkts: u64,
    pub bytes: u64,
    pub first_ns: Option<u64>,
    pub last_ns: Option<u64>,
    /// 按源节点统计的包数
    pub by_source: BTreeMap<usize, u64>,
}

/// 记下收到的每个包。clone 出来的副本共享同一份报告。
#[derive(Debug, Default, Clone)]
pub struct Sink {
    report: Arc<Mutex<SinkReport>>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> SinkReport {
        self.report.lock().expect("sink lock").clone()
    }
}

impl PacketHandler for Sink {
    fn on_packet(&mut self, _net: &mut Network, cx: &mut Context<'_>, _node: NodeId, pkt: Packet) {
        let now = cx.now().0;
        let mut r = self.report.lock().expect("sink lock");
        r.pkts += 1;
        r.bytes += pkt.size_bytes as u64;
        r.first_ns.get_or_insert(now);
        r.last_ns = Some(now);
        *r.by_source.entry(pkt.source.0).or_default() += 1;
    }
}
