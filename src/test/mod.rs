mod multi_queue;
mod ping;
mod process;
mod queues;
mod sim_time;
mod simulator;

use crate::sim::{Context, Process, Scheduler, Terminated, World, Yield};
use std::any::Any;
use std::sync::{Arc, Mutex};

/// 用闭包描述的进程：每次 `resume` 调用一次闭包
struct Script<F> {
    name: String,
    f: F,
}

impl<F> Process for Script<F>
where
    F: FnMut(&mut Context<'_>, &mut dyn World) -> Result<Yield, Terminated> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated> {
        (self.f)(cx, world)
    }
}

pub(crate) fn script<F>(name: &str, f: F) -> Box<dyn Process>
where
    F: FnMut(&mut Context<'_>, &mut dyn World) -> Result<Yield, Terminated> + Send + 'static,
{
    Box::new(Script {
        name: name.to_string(),
        f,
    })
}

pub(crate) type Log = Arc<Mutex<Vec<(u64, &'static str)>>>;

pub(crate) fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<(u64, &'static str)> {
    log.lock().expect("log lock").clone()
}

#[derive(Default)]
pub(crate) struct DummyWorld {
    pub(crate) ticks: usize,
}

impl World for DummyWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, _sched: &mut dyn Scheduler) {
        self.ticks = self.ticks.saturating_add(1);
    }
}
