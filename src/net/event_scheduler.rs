//! 节点事件调度进程
//!
//! 每个节点一个：等待本地事件队列头部到期，然后分发。头部在等待期间被
//! 更早的事件插队时，插入方会唤醒本进程，本进程重新计算等待时间。

use super::id::{NodeId, PathId};
use super::event::NetEvent;
use super::net_world::NetWorld;
use super::network::Network;
use super::node::DispatchState;
use crate::queue::Handle;
use crate::sim::{Context, Process, Scheduler, Terminated, World, Yield};
use crate::trace::{LossReason, QueueRef};
use tracing::{debug, trace, warn};

/// 驱动一个节点本地事件队列的进程
#[derive(Debug)]
pub struct EventScheduler {
    node: NodeId,
    name: String,
}

impl EventScheduler {
    pub fn new(node: NodeId, node_name: &str) -> Self {
        Self {
            node,
            name: format!("{node_name}/event-scheduler"),
        }
    }
}

impl Process for EventScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated> {
        NetWorld::net_mut(world).run_event_loop(cx, self.node)
    }
}

impl Network {
    /// 分发所有已到期的事件，返回下一个让出点
    pub(crate) fn run_event_loop(
        &mut self,
        cx: &mut Context<'_>,
        node_id: NodeId,
    ) -> Result<Yield, Terminated> {
        loop {
            if let Err(t) = cx.check_terminated() {
                self.nodes[node_id.0].dispatch_state = DispatchState::Aborted;
                debug!(node = ?node_id, "事件调度进程被终止");
                return Err(t);
            }

            let now = cx.now();
            let node = &mut self.nodes[node_id.0];
            let Some(head_at) = node.events.peek_time() else {
                node.dispatch_state = DispatchState::Idle;
                if node.alive {
                    return Ok(Yield::BlockIndefinitely);
                }
                debug!(node = ?node_id, "节点已关闭且没有待处理事件");
                return Ok(Yield::Finished);
            };

            // 上次让出时记录了头部；被唤醒后头部换了，说明有更早的事件插队
            if node.dispatch_state == DispatchState::WaitingForEvent {
                node.dispatch_state = DispatchState::Idle;
                if !node.events.head_did_not_change() {
                    debug!(node = ?node_id, at = ?head_at, "头部被插队，重新计算");
                    continue;
                }
            }
            if head_at > now {
                node.events.store_head_state();
                node.dispatch_state = DispatchState::WaitingForEvent;
                return Ok(Yield::BlockFor(head_at.saturating_sub(now)));
            }
            if head_at < now {
                warn!(node = ?node_id, at = ?head_at, now = ?now, "⏰ 事件已过期");
                self.stats.expired_events += 1;
                self.tracer.on_node_error(now, node_id, "expired event");
            }

            let node = &mut self.nodes[node_id.0];
            let item = node.events.dequeue_head();
            node.dispatch_state = DispatchState::Dispatching;
            self.stats.dispatched_events += 1;
            trace!(node = ?node_id, event = ?item.id, kind = ?item.event.kind, "分发事件");
            self.dispatch(cx, node_id, item.event.kind);
            self.nodes[node_id.0].dispatch_state = DispatchState::Idle;
        }
    }

    fn dispatch(&mut self, sched: &mut dyn Scheduler, node_id: NodeId, kind: NetEvent) {
        match kind {
            NetEvent::Departure { path } => self.send_packet(sched, path),
            NetEvent::Arrival { packet, path } => self.on_arrival(sched, node_id, packet, path),
            NetEvent::UserTimer { mut owner, message } => {
                owner.on_timer(self, sched, node_id, message)
            }
        }
    }

    /// 包到达：移出在途计数，放入接收队列，然后唤醒所有等待接收的进程。
    fn on_arrival(&mut self, sched: &mut dyn Scheduler, node_id: NodeId, h: Handle, path_id: PathId) {
        let now = sched.current_time();
        self.paths[path_id.0]
            .in_flight
            .account_dequeue()
            .expect("arrival without a matching departure");
        let pq = QueueRef::InFlight { path: path_id.0 };
        let rq = QueueRef::ReceiveQueue { node: node_id.0 };

        let node = &mut self.nodes[node_id.0];
        let enqueued = node.rx.enqueue(&mut self.packets, h);
        let waiters = std::mem::take(&mut node.rx_waiters);
        match enqueued {
            Ok(()) => {
                let pkt = &self.packets[h];
                self.stats.delivered_pkts += 1;
                self.stats.delivered_bytes += pkt.size_bytes as u64;
                debug!(node = ?node_id, seq = pkt.seq, waiters = waiters.len(), "✅ 包到达接收队列");
                self.tracer.on_packet_move(now, pkt, pq, rq);
            }
            Err(e) => {
                let pkt = self.packets.remove(h);
                self.stats.receive_drops += 1;
                warn!(node = ?node_id, seq = pkt.seq, error = %e, "🗑️  接收队列已满，丢包");
                self.tracer
                    .on_packet_loss(now, &pkt, pq, rq, LossReason::ReceiveQueueFull);
            }
        }

        // 所有等待者一起被唤醒，只有先运行的能取到包
        for pid in waiters {
            sched.activate_now(pid);
        }
    }
}
