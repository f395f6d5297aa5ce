//! 网络模拟模块
//!
//! 节点、路径、数据包，以及驱动每个节点本地事件队列的调度进程。

// 子模块声明
mod error;
mod event;
mod event_scheduler;
mod id;
mod net_world;
mod network;
mod node;
mod packet;
mod path;
mod propagation;
mod stats;

// 重新导出公共接口
pub use error::NetError;
pub use event::{NetEvent, TimerHandler, TimerId, TimerMessage};
pub use event_scheduler::EventScheduler;
pub use id::{NodeId, PathId};
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{DispatchState, Node, NodeConfig};
pub use packet::Packet;
pub use path::{Bandwidth, Path, PathConfig, PathState};
pub use propagation::Propagation;
pub use stats::Stats;
