//! 队列基础设施
//!
//! - `AccountingQueue`：只做 size/limit 记账
//! - `Arena`：可入队元素的存储，每个元素带 specific/main 两组链接
//! - `PacketQueue`：单个 FIFO 子队列
//! - `MultiQueue`：多个子队列 + 一条聚合链表，支持匿名出队与按 key 出队

mod accounting;
mod arena;
mod multi_queue;
mod packet_queue;

pub use accounting::AccountingQueue;
pub use arena::{Arena, Handle};
pub use multi_queue::{Classifier, MultiQueue};
pub use packet_queue::PacketQueue;

/// 队列操作错误。均可恢复，由调用方决定丢弃/重试。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue is full")]
    Full,
    #[error("queue is empty")]
    Empty,
    #[error("item is already queued")]
    AlreadyQueued,
    #[error("no sub-queue registered under key {0}")]
    InvalidKey(String),
}
