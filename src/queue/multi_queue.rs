//! 多队列
//!
//! 按 key 管理多个 `PacketQueue`，外加一个隐式的匿名子队列（兜底）。
//! 所有成员元素通过 `main` 链接串成一条聚合链表：
//! - 匿名出队：取聚合链表头，它必然也是某个子队列的头，O(1)
//! - 按 key 出队：取该子队列头，再把聚合链表从它两侧拼接起来，O(1)

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use super::accounting::AccountingQueue;
use super::arena::{Arena, Handle, Lane, List, QueueTag};
use super::packet_queue::PacketQueue;
use super::QueueError;

/// 从元素推导子队列 key；返回 None 或未注册的 key 时落到匿名子队列。
pub type Classifier<T, K> = fn(&T) -> Option<K>;

const ANONYMOUS: QueueTag = QueueTag(0);

#[derive(Debug)]
pub struct MultiQueue<T, K> {
    acct: AccountingQueue,
    subs: Vec<PacketQueue>,
    keys: HashMap<K, QueueTag>,
    main: List,
    classify: Classifier<T, K>,
}

impl<T, K> MultiQueue<T, K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(name: impl Into<String>, classify: Classifier<T, K>) -> Self {
        let name = name.into();
        let anonymous = PacketQueue::new(format!("{name}/anonymous"));
        Self {
            acct: AccountingQueue::new(name),
            subs: vec![anonymous],
            keys: HashMap::new(),
            main: List::default(),
            classify,
        }
    }

    pub fn name(&self) -> &str {
        self.acct.name()
    }

    /// 注册一个子队列。同一个 key 不允许重复注册，子队列必须为空。
    pub fn add_queue(&mut self, key: K, mut queue: PacketQueue) {
        assert!(
            !self.keys.contains_key(&key),
            "sub-queue key {key:?} registered twice on {}",
            self.name()
        );
        assert!(queue.is_empty(), "sub-queue {} must be empty", queue.name());
        let tag = QueueTag(u32::try_from(self.subs.len()).expect("too many sub-queues"));
        queue.set_tag(tag);
        self.subs.push(queue);
        self.keys.insert(key, tag);
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    /// 设置匿名子队列的长度上限（仅在其为空时生效）
    pub fn set_anonymous_limit(&mut self, limit: Option<usize>) -> bool {
        self.subs[ANONYMOUS.0 as usize].set_size_limit(limit)
    }

    /// 匿名入队：由分类函数决定子队列
    pub fn enqueue(&mut self, arena: &mut Arena<T>, h: Handle) -> Result<(), QueueError> {
        let item = arena
            .get(h)
            .unwrap_or_else(|| panic!("stale arena handle {h:?}"));
        let tag = (self.classify)(item)
            .and_then(|key| self.keys.get(&key).copied())
            .unwrap_or(ANONYMOUS);
        self.link(arena, h, tag)
    }

    /// 按 key 入队
    pub fn enqueue_keyed(
        &mut self,
        arena: &mut Arena<T>,
        h: Handle,
        key: &K,
    ) -> Result<(), QueueError> {
        let tag = self.tag_of(key)?;
        self.link(arena, h, tag)
    }

    /// 匿名出队：按全局到达顺序
    pub fn dequeue(&mut self, arena: &mut Arena<T>) -> Result<Handle, QueueError> {
        let h = self.main.head.ok_or(QueueError::Empty)?;
        let tag = arena
            .queue_of(h)
            .unwrap_or_else(|| panic!("{h:?} in aggregate list without a sub-queue"));
        debug_assert_eq!(self.subs[tag.0 as usize].peek(), Ok(h));
        self.remove(arena, tag, h)?;
        Ok(h)
    }

    /// 按 key 出队
    pub fn dequeue_keyed(&mut self, arena: &mut Arena<T>, key: &K) -> Result<Handle, QueueError> {
        let tag = self.tag_of(key)?;
        let h = self.subs[tag.0 as usize].peek()?;
        self.remove(arena, tag, h)?;
        Ok(h)
    }

    pub fn peek(&self) -> Result<Handle, QueueError> {
        self.main.head.ok_or(QueueError::Empty)
    }

    pub fn peek_keyed(&self, key: &K) -> Result<Handle, QueueError> {
        let tag = self.tag_of(key)?;
        self.subs[tag.0 as usize].peek()
    }

    pub fn len(&self) -> usize {
        self.acct.size()
    }

    pub fn is_empty(&self) -> bool {
        self.acct.is_empty()
    }

    pub fn len_keyed(&self, key: &K) -> Result<usize, QueueError> {
        let tag = self.tag_of(key)?;
        Ok(self.subs[tag.0 as usize].len())
    }

    pub fn is_empty_keyed(&self, key: &K) -> Result<bool, QueueError> {
        Ok(self.len_keyed(key)? == 0)
    }

    /// 匿名子队列中的元素个数
    pub fn anonymous_len(&self) -> usize {
        self.subs[ANONYMOUS.0 as usize].len()
    }

    /// 聚合顺序列出所有元素
    pub fn handles(&self, arena: &Arena<T>) -> Vec<Handle> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.main.head;
        while let Some(h) = cur {
            out.push(h);
            cur = arena.next(h, Lane::Main);
        }
        out
    }

    /// 某个子队列内的元素顺序
    pub fn keyed_handles(&self, arena: &Arena<T>, key: &K) -> Result<Vec<Handle>, QueueError> {
        let tag = self.tag_of(key)?;
        Ok(self.subs[tag.0 as usize].handles(arena))
    }

    fn tag_of(&self, key: &K) -> Result<QueueTag, QueueError> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| QueueError::InvalidKey(format!("{key:?}")))
    }

    fn link(&mut self, arena: &mut Arena<T>, h: Handle, tag: QueueTag) -> Result<(), QueueError> {
        self.subs[tag.0 as usize].link_back(arena, h, Some(&mut self.main))?;
        self.acct.account_enqueue()
    }

    fn remove(&mut self, arena: &mut Arena<T>, tag: QueueTag, h: Handle) -> Result<(), QueueError> {
        arena.unlink(&mut self.main, Lane::Main, h);
        self.subs[tag.0 as usize].unlink(arena, h)?;
        self.acct.account_dequeue()
    }
}
