//! 路径类型
//!
//! 一条从 `from` 到 `to` 的单向路径：发送队列（建模串行化时延）、
//! 在途计数（不存数据，只记账）、随机丢包与传播时延。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::id::{NodeId, PathId};
use super::propagation::Propagation;
use crate::queue::{AccountingQueue, PacketQueue};
use crate::sim::SimTime;

/// 路径带宽（字节/秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// 不限速：发送时延为 0
    Unlimited,
    /// 为 0 时包被直接丢弃（相当于无穷时延）
    BytesPerSec(u64),
}

/// 路径配置
#[derive(Debug, Clone, PartialEq)]
pub struct PathConfig {
    pub bandwidth: Bandwidth,
    /// 丢包率（0.0 - 1.0）：抽到的均匀随机数 ≤ 它时丢包
    pub loss_rate: f64,
    pub propagation: Propagation,
    /// 发送队列容量（包数）
    pub sender_queue_limit: Option<usize>,
    /// 保序投递：后发的包一定晚于前一个包到达
    pub ordered: bool,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::Unlimited,
            loss_rate: 0.0,
            propagation: Propagation::default(),
            sender_queue_limit: Some(1024),
            ordered: false,
        }
    }
}

/// 路径状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    /// 发送队列为空
    Idle,
    /// 有一个出发事件在等待
    Sending,
}

/// 网络路径
#[derive(Debug)]
pub struct Path {
    pub id: PathId,
    pub from: NodeId,
    pub to: NodeId,
    pub config: PathConfig,
    pub(crate) sender_queue: PacketQueue,
    pub(crate) in_flight: AccountingQueue,
    pub(crate) state: PathState,
    rng: ChaCha8Rng,
    last_arrival: Option<SimTime>,
}

impl Path {
    pub(crate) fn new(id: PathId, from: NodeId, to: NodeId, config: PathConfig, seed: u64) -> Self {
        let name = format!("path{}:{}->{}", id.0, from.0, to.0);
        let sender_queue = match config.sender_queue_limit {
            Some(limit) => PacketQueue::with_limit(format!("{name}/sq"), limit),
            None => PacketQueue::new(format!("{name}/sq")),
        };
        Self {
            id,
            from,
            to,
            sender_queue,
            in_flight: AccountingQueue::new(format!("{name}/pq")),
            state: PathState::Idle,
            rng: ChaCha8Rng::seed_from_u64(Self::rng_seed(seed, id)),
            last_arrival: None,
            config,
        }
    }

    /// 每条路径独立的随机数种子，保证抽样序列与其它路径的交错无关
    pub fn rng_seed(network_seed: u64, id: PathId) -> u64 {
        network_seed ^ (id.0 as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// 发送指定字节数所需的时间；带宽为 0 时返回 None
    pub fn tx_time(&self, bytes: u32) -> Option<SimTime> {
        match self.config.bandwidth {
            Bandwidth::Unlimited => Some(SimTime::ZERO),
            Bandwidth::BytesPerSec(0) => None,
            Bandwidth::BytesPerSec(bps) => {
                // ceil(bytes / bps) 秒 -> 纳秒
                let nanos = ((bytes as u128).saturating_mul(1_000_000_000u128) + (bps as u128 - 1))
                    / bps as u128;
                Some(SimTime(nanos.min(u64::MAX as u128) as u64))
            }
        }
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    /// 发送队列中的包数
    pub fn queued(&self) -> usize {
        self.sender_queue.len()
    }

    /// 已出发、尚未到达的包数
    pub fn in_flight(&self) -> usize {
        self.in_flight.size()
    }

    /// 抽一个均匀随机数决定是否丢包
    pub(crate) fn draw_loss(&mut self) -> bool {
        let u: f64 = self.rng.r#gen();
        u <= self.config.loss_rate
    }

    /// 抽样传播时延；保序路径会拉长时延，保证严格晚于上一个到达。
    pub(crate) fn draw_delay(&mut self, now: SimTime) -> SimTime {
        let mut delay = self.config.propagation.sample(&mut self.rng);
        if self.config.ordered {
            if let Some(last) = self.last_arrival {
                if now.saturating_add(delay) <= last {
                    delay = last.saturating_sub(now).saturating_add(SimTime(1));
                }
            }
            self.last_arrival = Some(now.saturating_add(delay));
        }
        delay
    }
}
