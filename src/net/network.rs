//! 网络拓扑管理
//!
//! 网络持有所有节点、路径以及在途/排队中的包。所有调度原语都接收
//! `&mut dyn Scheduler`，因此既能在仿真开始前搭建场景时调用，也能在进程
//! 内部通过 `Context` 调用。

use std::collections::HashMap;

use super::error::NetError;
use super::event::{NetEvent, TimerHandler, TimerId, TimerMessage};
use super::event_scheduler::EventScheduler;
use super::id::{NodeId, PathId};
use super::node::{DispatchState, Node, NodeConfig};
use super::packet::Packet;
use super::path::{Path, PathConfig, PathState};
use super::stats::Stats;
use crate::queue::{Arena, Handle, PacketQueue, QueueError};
use crate::sim::{Context, Event, EventId, Pid, Scheduler, SimTime};
use crate::trace::{LossReason, NoopTracer, QueueRef, Tracer};
use tracing::{debug, info, trace, warn};

/// 网络拓扑
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) paths: Vec<Path>,
    edges: HashMap<(NodeId, NodeId), PathId>,
    pub(crate) packets: Arena<Packet>,
    next_seq: u64,
    seed: u64,
    pub(crate) tracer: Box<dyn Tracer>,
    pub stats: Stats,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Network {
    /// `seed` 决定所有路径的随机数序列
    pub fn new(seed: u64) -> Self {
        Self {
            nodes: Vec::new(),
            paths: Vec::new(),
            edges: HashMap::new(),
            packets: Arena::new(),
            next_seq: 0,
            seed,
            tracer: Box::new(NoopTracer),
            stats: Stats::default(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 替换追踪回调（应在创建节点之前设置，才能收到创建事件）
    pub fn set_tracer(&mut self, tracer: impl Tracer + 'static) {
        self.tracer = Box::new(tracer);
    }

    /// 添加节点，并启动驱动它的事件调度进程
    pub fn add_node(&mut self, sched: &mut dyn Scheduler, name: impl Into<String>) -> NodeId {
        self.add_node_with(sched, name, &NodeConfig::default())
    }

    pub fn add_node_with(
        &mut self,
        sched: &mut dyn Scheduler,
        name: impl Into<String>,
        config: &NodeConfig,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let name = name.into();
        let pid = sched.start(Box::new(EventScheduler::new(id, &name)));
        info!(node = ?id, name = %name, pid = ?pid, "🖥️  添加节点");
        self.tracer.on_node_created(sched.current_time(), id, &name);
        self.nodes.push(Node::new(id, name, pid, config));
        id
    }

    /// 连接两个节点（创建单向路径）
    pub fn connect(
        &mut self,
        sched: &dyn Scheduler,
        from: NodeId,
        to: NodeId,
        config: PathConfig,
    ) -> Result<PathId, NetError> {
        self.check_node(from)?;
        self.check_node(to)?;
        if self.edges.contains_key(&(from, to)) {
            return Err(NetError::DuplicatePath { from, to });
        }
        if !(0.0..=1.0).contains(&config.loss_rate) {
            return Err(NetError::InvalidConfig(format!(
                "loss_rate {} is outside [0, 1]",
                config.loss_rate
            )));
        }
        config.propagation.validate().map_err(NetError::InvalidConfig)?;

        let id = PathId(self.paths.len());
        let path = Path::new(id, from, to, config, self.seed);
        debug!(
            path = ?id,
            from = ?from,
            to = ?to,
            bandwidth = ?path.config.bandwidth,
            loss_rate = path.config.loss_rate,
            "🔗 创建路径"
        );
        self.tracer.on_path_created(sched.current_time(), &path);
        self.paths.push(path);
        self.edges.insert((from, to), id);
        Ok(id)
    }

    fn check_node(&self, id: NodeId) -> Result<(), NetError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(NetError::UnknownNode(id))
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn path(&self, id: PathId) -> &Path {
        &self.paths[id.0]
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn path_between(&self, from: NodeId, to: NodeId) -> Option<PathId> {
        self.edges.get(&(from, to)).copied()
    }

    /// 仍存活（排队或在途）的包数
    pub fn live_packets(&self) -> usize {
        self.packets.len()
    }

    /// 创建数据包，序列号全网单调递增
    pub fn make_packet(
        &mut self,
        source: NodeId,
        destination: NodeId,
        kind: u32,
        size_bytes: u32,
        payload: Option<Vec<u8>>,
    ) -> Packet {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        Packet {
            source,
            destination,
            kind,
            size_bytes,
            seq,
            payload,
        }
    }

    /// 创建一个包并交给 `from -> to` 的路径，返回包的序列号
    pub fn send(
        &mut self,
        sched: &mut dyn Scheduler,
        from: NodeId,
        to: NodeId,
        kind: u32,
        size_bytes: u32,
        payload: Option<Vec<u8>>,
    ) -> Result<u64, NetError> {
        let path = self
            .path_between(from, to)
            .ok_or(NetError::NoPath { from, to })?;
        let pkt = self.make_packet(from, to, kind, size_bytes, payload);
        let seq = pkt.seq;
        self.add_packet(sched, path, pkt)?;
        Ok(seq)
    }

    /// 把包放进路径的发送队列。发送队列原本为空时调度出发事件。
    #[tracing::instrument(skip(self, sched, pkt), fields(seq = pkt.seq, size = pkt.size_bytes))]
    pub fn add_packet(
        &mut self,
        sched: &mut dyn Scheduler,
        path_id: PathId,
        pkt: Packet,
    ) -> Result<(), NetError> {
        let now = sched.current_time();
        let path = self
            .paths
            .get_mut(path_id.0)
            .ok_or(NetError::UnknownPath(path_id))?;
        let user = QueueRef::User { node: path.from.0 };
        let sq = QueueRef::SenderQueue { path: path_id.0 };
        let Some(tx) = path.tx_time(pkt.size_bytes) else {
            // 零带宽：包被直接丢弃，不入队、不记录、不报错
            trace!(path = ?path_id, seq = pkt.seq, "零带宽路径，包被丢弃");
            return Ok(());
        };
        let was_empty = path.sender_queue.is_empty();

        let h = self.packets.insert(pkt);
        if let Err(e) = path.sender_queue.enqueue(&mut self.packets, h) {
            let pkt = self.packets.remove(h);
            self.stats.sender_drops += 1;
            warn!(path = ?path_id, queued = path.sender_queue.len(), "🗑️  发送队列已满，丢包");
            self.tracer
                .on_packet_loss(now, &pkt, user, sq, LossReason::SenderQueueFull);
            return Err(e.into());
        }
        self.stats.sent_pkts += 1;
        self.tracer.on_packet_move(now, &self.packets[h], user, sq);

        if !was_empty {
            trace!(queued = path.sender_queue.len(), "已有包在发送，排队等待");
            return Ok(());
        }
        path.state = PathState::Sending;
        debug!(tx_time = ?tx, "📤 调度出发事件");
        self.schedule_packet_departure(sched, tx, path_id);
        Ok(())
    }

    /// 发送队列头部的包完成串行化：抽样丢包，否则调度到达事件。
    /// 队列里还有包时接着调度下一个出发事件。
    #[tracing::instrument(skip(self, sched))]
    pub(crate) fn send_packet(&mut self, sched: &mut dyn Scheduler, path_id: PathId) {
        let now = sched.current_time();
        let path = &mut self.paths[path_id.0];
        let h = path
            .sender_queue
            .dequeue(&mut self.packets)
            .expect("departure with an empty sender queue");
        let sq = QueueRef::SenderQueue { path: path_id.0 };
        let pq = QueueRef::InFlight { path: path_id.0 };

        if path.draw_loss() {
            let pkt = self.packets.remove(h);
            self.stats.lost_pkts += 1;
            debug!(seq = pkt.seq, "💥 路径丢包");
            self.tracer
                .on_packet_loss(now, &pkt, sq, pq, LossReason::PathLoss);
        } else {
            let delay = path.draw_delay(now);
            path.in_flight
                .account_enqueue()
                .expect("in-flight accounting is unbounded");
            trace!(seq = self.packets[h].seq, delay = ?delay, "包出发");
            self.tracer.on_packet_move(now, &self.packets[h], sq, pq);
            self.schedule_packet_arrival(sched, delay, h, path_id);
        }

        let path = &mut self.paths[path_id.0];
        let next_tx = path
            .sender_queue
            .peek()
            .ok()
            .and_then(|next| path.tx_time(self.packets[next].size_bytes));
        match next_tx {
            Some(tx) => {
                self.schedule_packet_departure(sched, tx, path_id);
            }
            None => {
                path.state = PathState::Idle;
                trace!("发送队列已空");
            }
        }
    }

    /// 在路径的发送端节点上调度出发事件
    pub fn schedule_packet_departure(
        &mut self,
        sched: &mut dyn Scheduler,
        delay: SimTime,
        path: PathId,
    ) -> EventId {
        let node = self.paths[path.0].from;
        self.schedule_event(sched, node, delay, NetEvent::Departure { path })
    }

    /// 在路径的接收端节点上调度到达事件
    pub fn schedule_packet_arrival(
        &mut self,
        sched: &mut dyn Scheduler,
        delay: SimTime,
        packet: Handle,
        path: PathId,
    ) -> EventId {
        let node = self.paths[path.0].to;
        self.schedule_event(sched, node, delay, NetEvent::Arrival { packet, path })
    }

    /// 在 `node` 上调度一个用户定时器，到期时调用 `owner.on_timer`
    pub fn schedule_user_timer(
        &mut self,
        sched: &mut dyn Scheduler,
        node: NodeId,
        delay: SimTime,
        owner: Box<dyn TimerHandler>,
        message: TimerMessage,
    ) -> TimerId {
        let event = self.schedule_event(sched, node, delay, NetEvent::UserTimer { owner, message });
        TimerId { node, event }
    }

    /// 取消尚未触发的用户定时器
    pub fn cancel_user_timer(&mut self, id: TimerId) -> bool {
        let cancelled = self.nodes[id.node.0]
            .events
            .cancel_user_timer(id.event)
            .is_some();
        trace!(timer = ?id, cancelled, "取消定时器");
        cancelled
    }

    /// 插入节点事件队列；成为新头部时唤醒该节点的事件调度进程
    fn schedule_event(
        &mut self,
        sched: &mut dyn Scheduler,
        node_id: NodeId,
        delay: SimTime,
        kind: NetEvent,
    ) -> EventId {
        let now = sched.current_time();
        let node = &mut self.nodes[node_id.0];
        let (id, head_changed) = node.events.enqueue(Event::after(now, delay, kind));
        trace!(
            node = ?node_id,
            event = ?id,
            at = ?now.saturating_add(delay),
            head_changed,
            "本地事件入队"
        );
        if head_changed {
            sched.activate_now(node.scheduler_pid);
        }
        id
    }

    /// 从节点接收队列取一个包；队列为空时登记为等待者并返回 None，
    /// 调用方随后应 `Yield::BlockIndefinitely`。
    pub fn receive(&mut self, cx: &mut Context<'_>, node_id: NodeId) -> Option<Packet> {
        let node = &mut self.nodes[node_id.0];
        match node.rx.dequeue(&mut self.packets) {
            Ok(h) => {
                node.rx_waiters.remove(&cx.pid());
                Some(self.consume(cx.now(), node_id, h))
            }
            Err(_) => {
                node.rx_waiters.insert(cx.pid());
                None
            }
        }
    }

    /// 只接收来自 `from` 的包；`from` 必须先用 `open_receive_queue` 注册
    pub fn receive_from(
        &mut self,
        cx: &mut Context<'_>,
        node_id: NodeId,
        from: NodeId,
    ) -> Result<Option<Packet>, NetError> {
        let node = &mut self.nodes[node_id.0];
        match node.rx.dequeue_keyed(&mut self.packets, &from) {
            Ok(h) => {
                node.rx_waiters.remove(&cx.pid());
                Ok(Some(self.consume(cx.now(), node_id, h)))
            }
            Err(QueueError::Empty) => {
                node.rx_waiters.insert(cx.pid());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn consume(&mut self, now: SimTime, node: NodeId, h: Handle) -> Packet {
        let pkt = self.packets.remove(h);
        self.stats.received_pkts += 1;
        trace!(node = ?node, seq = pkt.seq, "📥 用户取走包");
        self.tracer.on_packet_move(
            now,
            &pkt,
            QueueRef::ReceiveQueue { node: node.0 },
            QueueRef::User { node: node.0 },
        );
        pkt
    }

    /// 为来自 `from` 的包在节点上开一个独立的接收子队列
    pub fn open_receive_queue(
        &mut self,
        node_id: NodeId,
        from: NodeId,
        limit: Option<usize>,
    ) -> Result<(), NetError> {
        self.check_node(node_id)?;
        self.check_node(from)?;
        let node = &mut self.nodes[node_id.0];
        if node.rx.contains_key(&from) {
            return Err(QueueError::InvalidKey(format!("{from:?} already has a receive queue")).into());
        }
        let name = format!("{}/rq/{}", node.name, from.0);
        let queue = match limit {
            Some(limit) => PacketQueue::with_limit(name, limit),
            None => PacketQueue::new(name),
        };
        node.rx.add_queue(from, queue);
        Ok(())
    }

    /// 手动登记一个等待接收的进程
    pub fn register_receive_waiter(&mut self, node: NodeId, pid: Pid) {
        self.nodes[node.0].rx_waiters.insert(pid);
    }

    pub fn unregister_receive_waiter(&mut self, node: NodeId, pid: Pid) -> bool {
        self.nodes[node.0].rx_waiters.remove(&pid)
    }

    /// 关闭节点：事件队列处理完后，事件调度进程结束
    pub fn shutdown_node(&mut self, sched: &mut dyn Scheduler, node_id: NodeId) {
        let node = &mut self.nodes[node_id.0];
        node.alive = false;
        debug!(node = ?node_id, pending = node.events.len(), "🛑 关闭节点");
        sched.activate_now(node.scheduler_pid);
    }

    /// 关闭所有节点
    pub fn shutdown(&mut self, sched: &mut dyn Scheduler) {
        for i in 0..self.nodes.len() {
            self.shutdown_node(sched, NodeId(i));
        }
    }

    pub fn dispatch_state(&self, node: NodeId) -> DispatchState {
        self.nodes[node.0].dispatch_state
    }
}
