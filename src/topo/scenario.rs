//! JSON 场景
//!
//! 描述节点、路径和定速流，然后在给定的调度器/网络上搭建出来。
//! 每条流的目的节点会自动挂一个 `Sink` 收包进程。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::{ConstantRateSender, Receiver, Sink};
use crate::net::{Bandwidth, NetError, Network, NodeConfig, NodeId, PathConfig, Propagation};
use crate::sim::{Scheduler, SimTime};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate node name {0:?}")]
    DuplicateNode(String),
    #[error("unknown node name {0:?}")]
    UnknownNode(String),
    #[error(transparent)]
    Net(#[from] NetError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub seed: u64,
    /// 仿真截止时间；缺省时运行到没有事件
    #[serde(default)]
    pub until_ms: Option<f64>,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub paths: Vec<PathSpec>,
    #[serde(default)]
    pub flows: Vec<FlowSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub rx_queue_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSpec {
    pub from: String,
    pub to: String,
    /// 字节/秒；缺省为不限速
    #[serde(default)]
    pub bandwidth_bytes_per_sec: Option<u64>,
    #[serde(default)]
    pub loss_rate: f64,
    #[serde(default)]
    pub propagation: Propagation,
    #[serde(default)]
    pub sender_queue_limit: Option<usize>,
    #[serde(default)]
    pub ordered: bool,
    /// 同时创建反方向的路径
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSpec {
    pub from: String,
    pub to: String,
    pub packets: u64,
    pub size_bytes: u32,
    #[serde(default)]
    pub interval_ms: f64,
    #[serde(default)]
    pub start_ms: f64,
    #[serde(default)]
    pub kind: u32,
}

impl ScenarioSpec {
    pub fn from_json(s: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn until(&self) -> Option<SimTime> {
        self.until_ms.map(|ms| SimTime::from_secs_f64(ms / 1e3))
    }
}

impl PathSpec {
    fn config(&self) -> PathConfig {
        let defaults = PathConfig::default();
        PathConfig {
            bandwidth: self
                .bandwidth_bytes_per_sec
                .map_or(Bandwidth::Unlimited, Bandwidth::BytesPerSec),
            loss_rate: self.loss_rate,
            propagation: self.propagation.clone(),
            sender_queue_limit: self.sender_queue_limit.or(defaults.sender_queue_limit),
            ordered: self.ordered,
        }
    }
}

/// 搭建好的场景：节点名到 id 的映射，以及每个目的节点的收包统计
#[derive(Debug, Default)]
pub struct Scenario {
    pub nodes: BTreeMap<String, NodeId>,
    pub sinks: BTreeMap<String, Sink>,
}

/// 在 `net` 上创建场景中的节点、路径、流
pub fn build_scenario(
    spec: &ScenarioSpec,
    sched: &mut dyn Scheduler,
    net: &mut Network,
) -> Result<Scenario, ScenarioError> {
    let mut scenario = Scenario::default();

    for n in &spec.nodes {
        if scenario.nodes.contains_key(&n.name) {
            return Err(ScenarioError::DuplicateNode(n.name.clone()));
        }
        let config = NodeConfig {
            rx_queue_limit: n.rx_queue_limit.or(NodeConfig::default().rx_queue_limit),
        };
        let id = net.add_node_with(sched, n.name.clone(), &config);
        scenario.nodes.insert(n.name.clone(), id);
    }

    let lookup = |scenario: &Scenario, name: &str| {
        scenario
            .nodes
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownNode(name.to_string()))
    };

    for p in &spec.paths {
        let from = lookup(&scenario, &p.from)?;
        let to = lookup(&scenario, &p.to)?;
        net.connect(sched, from, to, p.config())?;
        if p.bidirectional {
            net.connect(sched, to, from, p.config())?;
        }
    }

    for f in &spec.flows {
        let from = lookup(&scenario, &f.from)?;
        let to = lookup(&scenario, &f.to)?;
        if net.path_between(from, to).is_none() {
            return Err(NetError::NoPath { from, to }.into());
        }
        if !scenario.sinks.contains_key(&f.to) {
            let sink = Sink::new();
            sched.start(Box::new(Receiver::new(net, to, sink.clone())));
            scenario.sinks.insert(f.to.clone(), sink);
        }
        let sender = ConstantRateSender::new(
            from,
            to,
            f.size_bytes,
            SimTime::from_secs_f64(f.interval_ms / 1e3),
            f.packets,
        )
        .with_kind(f.kind)
        .with_start_delay(SimTime::from_secs_f64(f.start_ms / 1e3));
        debug!(from = %f.from, to = %f.to, packets = f.packets, "添加流");
        sched.start(Box::new(sender));
    }

    info!(
        nodes = spec.nodes.len(),
        paths = spec.paths.len(),
        flows = spec.flows.len(),
        "🏗️  场景搭建完成"
    );
    Ok(scenario)
}
