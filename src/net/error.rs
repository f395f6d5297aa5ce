//! 网络层错误

use super::id::{NodeId, PathId};
use crate::queue::QueueError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown path {0:?}")]
    UnknownPath(PathId),
    #[error("no path from {from:?} to {to:?}")]
    NoPath { from: NodeId, to: NodeId },
    #[error("path from {from:?} to {to:?} already exists")]
    DuplicatePath { from: NodeId, to: NodeId },
    #[error("invalid path config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
