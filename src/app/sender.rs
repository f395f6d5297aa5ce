//! 定速发送

use crate::net::{NetWorld, NodeId};
use crate::sim::{Context, Process, SimTime, Terminated, World, Yield};
use tracing::{debug, warn};

/// 从 `from` 向 `to` 每隔 `interval` 发一个包，共 `count` 个
#[derive(Debug)]
pub struct ConstantRateSender {
    name: String,
    from: NodeId,
    to: NodeId,
    kind: u32,
    size_bytes: u32,
    interval: SimTime,
    remaining: u64,
    start_delay: SimTime,
    started: bool,
}

impl ConstantRateSender {
    pub fn new(from: NodeId, to: NodeId, size_bytes: u32, interval: SimTime, count: u64) -> Self {
        Self {
            name: format!("sender {}->{}", from.0, to.0),
            from,
            to,
            kind: 0,
            size_bytes,
            interval,
            remaining: count,
            start_delay: SimTime::ZERO,
            started: false,
        }
    }

    pub fn with_kind(mut self, kind: u32) -> Self {
        self.kind = kind;
        self
    }

    /// 第一个包在进程启动后 `delay` 才发送
    pub fn with_start_delay(mut self, delay: SimTime) -> Self {
        self.start_delay = delay;
        self
    }
}

impl Process for ConstantRateSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated> {
        cx.check_terminated()?;
        if !self.started {
            self.started = true;
            if self.start_delay > SimTime::ZERO {
                return Ok(Yield::BlockFor(self.start_delay));
            }
        }
        if self.remaining == 0 {
            return Ok(Yield::Finished);
        }

        let net = NetWorld::net_mut(world);
        match net.send(cx, self.from, self.to, self.kind, self.size_bytes, None) {
            Ok(seq) => debug!(seq, remaining = self.remaining - 1, "发送一个包"),
            Err(e) => warn!(from = ?self.from, to = ?self.to, error = %e, "发送失败"),
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Ok(Yield::Finished)
        } else {
            Ok(Yield::BlockFor(self.interval))
        }
    }
}
