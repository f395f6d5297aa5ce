//! 收包循环

use crate::net::{NetWorld, Network, NodeId, Packet, TimerHandler, TimerMessage};
use crate::sim::{Context, Pid, Process, Scheduler, Terminated, World, Yield};
use tracing::{trace, warn};

/// 收到包时的回调
pub trait PacketHandler: Send {
    fn on_packet(&mut self, net: &mut Network, cx: &mut Context<'_>, node: NodeId, pkt: Packet);
}

/// 不断从节点接收队列取包交给 `handler`；队列空时无限期阻塞，
/// 直到有包到达把它唤醒。
pub struct Receiver<H> {
    node: NodeId,
    from: Option<NodeId>,
    name: String,
    handler: H,
}

impl<H: PacketHandler> Receiver<H> {
    pub fn new(net: &Network, node: NodeId, handler: H) -> Self {
        Self {
            node,
            from: None,
            name: format!("{}/receiver", net.node(node).name),
            handler,
        }
    }

    /// 只接收来自 `from` 的包（需要先 `open_receive_queue`）
    pub fn from_peer(net: &Network, node: NodeId, from: NodeId, handler: H) -> Self {
        Self {
            node,
            from: Some(from),
            name: format!("{}/receiver<-{}", net.node(node).name, from.0),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H: PacketHandler> Process for Receiver<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated> {
        let net = NetWorld::net_mut(world);
        loop {
            cx.check_terminated()?;
            let received = match self.from {
                None => net.receive(cx, self.node),
                Some(from) => match net.receive_from(cx, self.node, from) {
                    Ok(pkt) => pkt,
                    Err(e) => {
                        warn!(node = ?self.node, error = %e, "接收失败，退出收包循环");
                        return Ok(Yield::Finished);
                    }
                },
            };
            let Some(pkt) = received else {
                trace!(node = ?self.node, "接收队列为空，等待");
                return Ok(Yield::BlockIndefinitely);
            };
            self.handler.on_packet(net, cx, self.node, pkt);
        }
    }
}

/// 到期时唤醒一个进程的定时器
#[derive(Debug, Clone, Copy)]
pub struct WakeProcess(pub Pid);

impl TimerHandler for WakeProcess {
    fn on_timer(
        &mut self,
        _net: &mut Network,
        sched: &mut dyn Scheduler,
        _node: NodeId,
        _message: TimerMessage,
    ) {
        sched.activate_now(self.0);
    }
}
