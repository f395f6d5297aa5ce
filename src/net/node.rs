//! 节点
//!
//! 每个节点拥有一条本地事件队列、一个接收多队列、一组等待接收的进程，
//! 以及驱动这一切的事件调度进程（见 `event_scheduler`）。

use std::collections::BTreeSet;

use super::event::NetEvent;
use super::id::NodeId;
use super::packet::Packet;
use crate::queue::MultiQueue;
use crate::sim::{LocalEventQueue, Pid};

/// 节点配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// 接收队列（匿名子队列）容量
    pub rx_queue_limit: Option<usize>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rx_queue_limit: Some(4096),
        }
    }
}

/// 事件调度进程的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    WaitingForEvent,
    Dispatching,
    Aborted,
}

/// 网络节点
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub(crate) scheduler_pid: Pid,
    pub(crate) events: LocalEventQueue<NetEvent>,
    pub(crate) rx: MultiQueue<Packet, NodeId>,
    pub(crate) rx_waiters: BTreeSet<Pid>,
    pub(crate) alive: bool,
    pub(crate) dispatch_state: DispatchState,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, scheduler_pid: Pid, config: &NodeConfig) -> Self {
        let mut rx = MultiQueue::new(format!("{name}/rq"), Packet::by_source);
        rx.set_anonymous_limit(config.rx_queue_limit);
        Self {
            id,
            name,
            scheduler_pid,
            events: LocalEventQueue::new(),
            rx,
            rx_waiters: BTreeSet::new(),
            alive: true,
            dispatch_state: DispatchState::Idle,
        }
    }

    /// 驱动本节点事件队列的进程
    pub fn scheduler_pid(&self) -> Pid {
        self.scheduler_pid
    }

    pub fn dispatch_state(&self) -> DispatchState {
        self.dispatch_state
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// 待处理的本地事件数
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// 本地事件队列中各事件的触发时间
    pub fn event_times(&self) -> Vec<crate::sim::SimTime> {
        self.events.times()
    }

    /// 接收队列中的包数
    pub fn rx_len(&self) -> usize {
        self.rx.len()
    }

    /// 正在等待接收的进程
    pub fn rx_waiters(&self) -> impl Iterator<Item = Pid> + '_ {
        self.rx_waiters.iter().copied()
    }
}
