//! 数据包类型
//!
//! 定义网络数据包。链接字段不在这里：数据包存放在 `Arena` 中，
//! 链接由 arena 槽位维护。

use super::id::NodeId;

/// 网络数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source: NodeId,
    pub destination: NodeId,
    /// 类型标记（由上层协议自行约定）
    pub kind: u32,
    pub size_bytes: u32,
    /// 由网络单调分配的序列号
    pub seq: u64,
    pub payload: Option<Vec<u8>>,
}

impl Packet {
    /// 按源节点分类（接收多队列的默认分类函数）
    pub fn by_source(pkt: &Packet) -> Option<NodeId> {
        Some(pkt.source)
    }

    /// 按类型标记分类
    pub fn by_kind(pkt: &Packet) -> Option<u32> {
        Some(pkt.kind)
    }
}
