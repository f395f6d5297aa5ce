//! 追踪事件记录
//!
//! - `Tracer`：核心在关键点调用的回调接口，默认全部为空操作
//! - `TraceRecorder`：把回调记录成结构化 JSON 事件，便于离线分析

mod tracer;
mod types;

pub use tracer::{NoopTracer, TraceRecorder, Tracer};
pub use types::{LossReason, QueueRef, TraceEvent, TraceEventKind};
