//! 激活请求
//!
//! 全局激活队列中的一项：在 `at` 时刻恢复进程 `pid`。

use super::process::Pid;
use super::time::SimTime;
use std::cmp::Ordering;

/// 激活请求，包含时刻、序列号、目标进程以及请求时进程的 epoch。
#[derive(Debug, Clone, Copy)]
pub(crate) struct Activation {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
    pub(crate) pid: Pid,
    pub(crate) epoch: u64,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for Activation {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for Activation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Activation {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Activation {}
