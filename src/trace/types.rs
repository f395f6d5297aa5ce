use serde::{Deserialize, Serialize};

/// 包所处的位置（用于 move/loss 事件的 from/to）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "queue", rename_all = "snake_case")]
pub enum QueueRef {
    /// 节点上的用户代码（创建或消费包的一方）
    User { node: usize },
    /// 路径发送队列
    SenderQueue { path: usize },
    /// 路径在途计数
    InFlight { path: usize },
    /// 节点接收队列
    ReceiveQueue { node: usize },
}

/// 丢包原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// 路径随机丢包
    PathLoss,
    /// 发送队列已满
    SenderQueueFull,
    /// 接收队列已满
    ReceiveQueueFull,
}

/// 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    NodeCreated {
        node: usize,
        name: String,
    },
    PathCreated {
        path: usize,
        from: usize,
        to: usize,
        loss_rate: f64,
    },
    Move {
        from: QueueRef,
        to: QueueRef,
    },
    Loss {
        from: QueueRef,
        to: QueueRef,
        reason: LossReason,
    },
    NodeError {
        node: usize,
        message: String,
    },
}

/// 一条追踪记录（JSON）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkt_seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkt_bytes: Option<u32>,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}
