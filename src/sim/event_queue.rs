//! 本地事件队列
//!
//! 每个节点一条，按绝对时间升序排列；相同时间按入队顺序（FIFO）。
//! 比当前头部更早的事件会成为新头部，调用方据此唤醒队列的拥有者。
//!
//! `store_head_state` / `head_did_not_change` 以事件标识比较头部：
//! 拥有者在计算“距头部还有多久”之后、真正出队之前，用它确认头部没有被插队。

use std::collections::VecDeque;

use super::event::{Event, EventId, EventItem, EventPayload};
use super::time::SimTime;

#[derive(Debug)]
pub struct LocalEventQueue<K> {
    items: VecDeque<EventItem<K>>,
    next_id: u64,
    snapshot: Option<EventId>,
}

impl<K> Default for LocalEventQueue<K> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            next_id: 0,
            snapshot: None,
        }
    }
}

impl<K: EventPayload> LocalEventQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入事件，返回 (事件标识, 是否成为新头部)。
    ///
    /// 插入点是第一个时间严格大于它的事件之前，所以同一时刻的事件保持 FIFO。
    pub fn enqueue(&mut self, event: Event<K>) -> (EventId, bool) {
        let id = EventId(self.next_id);
        self.next_id += 1;
        let pos = self.items.partition_point(|e| e.event.at <= event.at);
        self.items.insert(pos, EventItem { id, event });
        (id, pos == 0)
    }

    /// 按标识取消一个用户定时器；其它类型的事件永远不会被匹配。
    pub fn cancel_user_timer(&mut self, id: EventId) -> Option<Event<K>> {
        let pos = self
            .items
            .iter()
            .position(|e| e.id == id && e.event.kind.is_user_timer())?;
        self.items.remove(pos).map(|item| item.event)
    }

    /// 取出头部事件。调用方必须先确认队列非空。
    pub fn dequeue_head(&mut self) -> EventItem<K> {
        self.items
            .pop_front()
            .expect("dequeue_head on an empty event queue")
    }

    /// 记录当前头部
    pub fn store_head_state(&mut self) {
        self.snapshot = self.head_id();
    }

    /// 头部是否仍是上次记录的那个事件
    pub fn head_did_not_change(&self) -> bool {
        self.head_id() == self.snapshot
    }

    pub fn head_id(&self) -> Option<EventId> {
        self.items.front().map(|e| e.id)
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.items.front().map(|e| e.event.at)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 队列中各事件的触发时间（按出队顺序）
    pub fn times(&self) -> Vec<SimTime> {
        self.items.iter().map(|e| e.event.at).collect()
    }

    /// 丢弃所有事件，返回它们（用于节点被中止后的清理）
    pub fn drain(&mut self) -> Vec<EventItem<K>> {
        self.snapshot = None;
        self.items.drain(..).collect()
    }
}
