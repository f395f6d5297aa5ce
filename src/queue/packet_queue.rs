//! 双链接包队列
//!
//! 单个子队列：元素通过 `specific` 链接串起来。作为多队列成员时，
//! 入队会同时挂到聚合链表尾部。

use super::accounting::AccountingQueue;
use super::arena::{Arena, Handle, Lane, List, QueueTag};
use super::QueueError;

#[derive(Debug)]
pub struct PacketQueue {
    acct: AccountingQueue,
    list: List,
    tag: QueueTag,
}

impl PacketQueue {
    /// 不限长度的队列
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            acct: AccountingQueue::new(name),
            list: List::default(),
            tag: QueueTag::default(),
        }
    }

    /// 带长度上限的队列
    pub fn with_limit(name: impl Into<String>, limit: usize) -> Self {
        Self {
            acct: AccountingQueue::with_limit(name, limit),
            list: List::default(),
            tag: QueueTag::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.acct.name()
    }

    pub fn len(&self) -> usize {
        self.acct.size()
    }

    pub fn is_empty(&self) -> bool {
        self.acct.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.acct.is_full()
    }

    pub fn limit(&self) -> Option<usize> {
        self.acct.limit()
    }

    pub fn set_size_limit(&mut self, limit: Option<usize>) -> bool {
        self.acct.set_size_limit(limit)
    }

    /// 入队到尾部
    pub fn enqueue<T>(&mut self, arena: &mut Arena<T>, h: Handle) -> Result<(), QueueError> {
        self.link_back(arena, h, None)
    }

    /// 出队头部元素
    pub fn dequeue<T>(&mut self, arena: &mut Arena<T>) -> Result<Handle, QueueError> {
        let h = self.peek()?;
        self.unlink(arena, h)?;
        Ok(h)
    }

    /// 查看头部元素，不修改队列
    pub fn peek(&self) -> Result<Handle, QueueError> {
        self.list.head.ok_or(QueueError::Empty)
    }

    /// 按队列顺序列出所有元素
    pub fn handles<T>(&self, arena: &Arena<T>) -> Vec<Handle> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.list.head;
        while let Some(h) = cur {
            out.push(h);
            cur = arena.next(h, Lane::Specific);
        }
        out
    }

    pub(super) fn set_tag(&mut self, tag: QueueTag) {
        self.tag = tag;
    }

    /// 挂到本队列尾部；`main` 不为空时同时挂到聚合链表尾部。
    /// 满队列与重复入队都在修改任何链接之前拒绝。
    pub(super) fn link_back<T>(
        &mut self,
        arena: &mut Arena<T>,
        h: Handle,
        main: Option<&mut List>,
    ) -> Result<(), QueueError> {
        if arena.is_linked(h, Lane::Specific) || arena.is_linked(h, Lane::Main) {
            return Err(QueueError::AlreadyQueued);
        }
        if self.acct.is_full() {
            return Err(QueueError::Full);
        }
        arena.push_back(&mut self.list, Lane::Specific, h, self.tag);
        if let Some(main) = main {
            arena.push_back(main, Lane::Main, h, self.tag);
        }
        self.acct.account_enqueue()
    }

    /// 只从本队列的 `specific` 链表摘除；聚合链表由调用方负责。
    pub(super) fn unlink<T>(&mut self, arena: &mut Arena<T>, h: Handle) -> Result<(), QueueError> {
        debug_assert_eq!(arena.queue_of(h), Some(self.tag));
        arena.unlink(&mut self.list, Lane::Specific, h);
        self.acct.account_dequeue()
    }
}
