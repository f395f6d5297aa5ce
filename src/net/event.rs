//! 节点本地事件
//!
//! 三种事件：路径出发、包到达、用户定时器。

use std::any::Any;
use std::fmt;

use super::id::{NodeId, PathId};
use super::network::Network;
use crate::queue::Handle;
use crate::sim::{EventId, EventPayload, Scheduler};

/// 定时器消息：任意用户数据，回调里自行 downcast
pub type TimerMessage = Box<dyn Any + Send>;

/// 用户定时器的标识，用于取消
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    pub node: NodeId,
    pub event: EventId,
}

/// 定时器回调
pub trait TimerHandler: Send {
    fn on_timer(
        &mut self,
        net: &mut Network,
        sched: &mut dyn Scheduler,
        node: NodeId,
        message: TimerMessage,
    );
}

/// 节点本地事件的负载
pub enum NetEvent {
    /// 路径发送队列头部的包完成串行化
    Departure { path: PathId },
    /// 包经由路径到达本节点
    Arrival { packet: Handle, path: PathId },
    /// 用户定时器到期
    UserTimer {
        owner: Box<dyn TimerHandler>,
        message: TimerMessage,
    },
}

impl fmt::Debug for NetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetEvent::Departure { path } => f.debug_struct("Departure").field("path", path).finish(),
            NetEvent::Arrival { packet, path } => f
                .debug_struct("Arrival")
                .field("packet", packet)
                .field("path", path)
                .finish(),
            NetEvent::UserTimer { .. } => f.write_str("UserTimer"),
        }
    }
}

impl EventPayload for NetEvent {
    fn is_user_timer(&self) -> bool {
        matches!(self, NetEvent::UserTimer { .. })
    }
}
