//! 计数队列
//!
//! 只维护 size/limit 记账，不持有任何元素；所有队列类型都组合它。

use tracing::warn;

use super::QueueError;

/// 计数队列：名字、当前长度、可选的长度上限。
#[derive(Debug, Clone)]
pub struct AccountingQueue {
    name: String,
    size: usize,
    limit: Option<usize>,
}

impl AccountingQueue {
    /// 创建一个不限长度的计数队列
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            limit: None,
        }
    }

    /// 创建一个带长度上限的计数队列
    pub fn with_limit(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            size: 0,
            limit: Some(limit),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.size >= limit)
    }

    /// 记一次入队；满时返回 `QueueError::Full` 且不修改状态。
    pub fn account_enqueue(&mut self) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::Full);
        }
        self.size += 1;
        Ok(())
    }

    /// 记一次出队；空时返回 `QueueError::Empty`。
    pub fn account_dequeue(&mut self) -> Result<(), QueueError> {
        if self.size == 0 {
            return Err(QueueError::Empty);
        }
        self.size -= 1;
        Ok(())
    }

    /// 设置长度上限。只在队列为空时生效，返回是否生效。
    pub fn set_size_limit(&mut self, limit: Option<usize>) -> bool {
        if self.size != 0 {
            warn!(queue = %self.name, size = self.size, "队列非空，忽略上限修改");
            return false;
        }
        self.limit = limit;
        true
    }
}
