//! 追踪回调接口
//!
//! 核心在包转移、丢包、节点/路径创建时调用这些回调，但不依赖其实现；
//! `NoopTracer` 是默认值。

use std::sync::{Arc, Mutex};

use super::types::{LossReason, QueueRef, TraceEvent, TraceEventKind};
use crate::net::{NodeId, Packet, Path};
use crate::sim::SimTime;

pub trait Tracer: Send {
    fn on_packet_move(&mut self, _t: SimTime, _pkt: &Packet, _from: QueueRef, _to: QueueRef) {}

    fn on_packet_loss(
        &mut self,
        _t: SimTime,
        _pkt: &Packet,
        _from: QueueRef,
        _to: QueueRef,
        _reason: LossReason,
    ) {
    }

    fn on_node_created(&mut self, _t: SimTime, _node: NodeId, _name: &str) {}

    fn on_path_created(&mut self, _t: SimTime, _path: &Path) {}

    fn on_node_error(&mut self, _t: SimTime, _node: NodeId, _message: &str) {}
}

/// 什么都不做
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// 把回调记录成 `TraceEvent`（存内存，仿真结束后可写成 JSON）。
/// clone 出来的副本共享同一份记录。
#[derive(Debug, Default, Clone)]
pub struct TraceRecorder {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前记录的副本
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("trace lock").clone()
    }

    /// 取走所有记录
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock().expect("trace lock"))
    }

    fn push(&self, ev: TraceEvent) {
        self.events.lock().expect("trace lock").push(ev);
    }

    fn push_pkt(&self, t: SimTime, pkt: &Packet, kind: TraceEventKind) {
        self.push(TraceEvent {
            t_ns: t.0,
            pkt_seq: Some(pkt.seq),
            pkt_bytes: Some(pkt.size_bytes),
            kind,
        });
    }
}

impl Tracer for TraceRecorder {
    fn on_packet_move(&mut self, t: SimTime, pkt: &Packet, from: QueueRef, to: QueueRef) {
        self.push_pkt(t, pkt, TraceEventKind::Move { from, to });
    }

    fn on_packet_loss(
        &mut self,
        t: SimTime,
        pkt: &Packet,
        from: QueueRef,
        to: QueueRef,
        reason: LossReason,
    ) {
        self.push_pkt(t, pkt, TraceEventKind::Loss { from, to, reason });
    }

    fn on_node_created(&mut self, t: SimTime, node: NodeId, name: &str) {
        self.push(TraceEvent {
            t_ns: t.0,
            pkt_seq: None,
            pkt_bytes: None,
            kind: TraceEventKind::NodeCreated {
                node: node.0,
                name: name.to_string(),
            },
        });
    }

    fn on_path_created(&mut self, t: SimTime, path: &Path) {
        self.push(TraceEvent {
            t_ns: t.0,
            pkt_seq: None,
            pkt_bytes: None,
            kind: TraceEventKind::PathCreated {
                path: path.id.0,
                from: path.from.0,
                to: path.to.0,
                loss_rate: path.config.loss_rate,
            },
        });
    }

    fn on_node_error(&mut self, t: SimTime, node: NodeId, message: &str) {
        self.push(TraceEvent {
            t_ns: t.0,
            pkt_seq: None,
            pkt_bytes: None,
            kind: TraceEventKind::NodeError {
                node: node.0,
                message: message.to_string(),
            },
        });
    }
}
