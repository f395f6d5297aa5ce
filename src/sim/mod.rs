//! 仿真核心模块
//!
//! 全局调度器（时钟 + 激活队列 + 同一时刻屏障）、协作式进程、
//! 以及每个节点使用的本地事件队列。

// 子模块声明
mod activation;
mod event;
mod event_queue;
mod process;
mod scheduler;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use event::{Event, EventId, EventItem, EventPayload};
pub use event_queue::LocalEventQueue;
pub use process::{Context, Pid, Process, ProcessHandle, ProcessState, Terminated, Yield};
pub use scheduler::Scheduler;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
