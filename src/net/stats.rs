//! 统计信息
//!
//! 定义网络仿真统计数据结构。

use serde::Serialize;

/// 网络统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// 成功放入发送队列的包
    pub sent_pkts: u64,
    /// 到达目的节点接收队列的包
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 被用户代码从接收队列取走的包
    pub received_pkts: u64,
    /// 路径上随机丢失的包
    pub lost_pkts: u64,
    /// 发送队列满而丢弃的包
    pub sender_drops: u64,
    /// 接收队列满而丢弃的包
    pub receive_drops: u64,
    /// 已分发的本地事件
    pub dispatched_events: u64,
    /// 分发时已经过期的事件
    pub expired_events: u64,
}
