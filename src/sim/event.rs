//! 事件
//!
//! 本地事件队列中的一条记录：绝对触发时刻、创建时的相对时延、负载。

use super::time::SimTime;

/// 事件标识，在所属队列内唯一（单调分配）。用于头部快照比较与定时器取消。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

/// 事件负载需要告诉队列自己是否为可取消的用户定时器。
pub trait EventPayload {
    fn is_user_timer(&self) -> bool;
}

/// 一个事件：`at = 创建时刻 + delay`，入队后不再修改。
#[derive(Debug)]
pub struct Event<K> {
    pub at: SimTime,
    pub delay: SimTime,
    pub kind: K,
}

impl<K> Event<K> {
    /// 以 `now` 为基准创建事件
    pub fn after(now: SimTime, delay: SimTime, kind: K) -> Self {
        Self {
            at: now.saturating_add(delay),
            delay,
            kind,
        }
    }
}

/// 已入队的事件
#[derive(Debug)]
pub struct EventItem<K> {
    pub id: EventId,
    pub event: Event<K>,
}
