//! 网络世界实现
//!
//! 定义网络仿真的世界（World）实现，持有网络拓扑。

use super::network::Network;
use crate::sim::World;
use std::any::Any;

/// 一个默认的网络世界实现：持有 Network。
#[derive(Default)]
pub struct NetWorld {
    pub net: Network,
}

impl NetWorld {
    /// 指定随机数种子
    pub fn with_seed(seed: u64) -> Self {
        Self {
            net: Network::new(seed),
        }
    }

    /// 从 `dyn World` 中取出网络（进程在 `resume` 中使用）
    pub fn net_mut(world: &mut dyn World) -> &mut Network {
        &mut world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld")
            .net
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
