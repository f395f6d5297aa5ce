//! 协作式进程
//!
//! 进程是一台显式状态机：`resume` 一直执行到下一个让出点，然后用返回值
//! 告诉全局调度器自己要阻塞多久（或已结束）。进程只能阻塞自己；
//! 对其它进程唯一允许的操作是请求唤醒（`wake_up`）。

use super::scheduler::Scheduler;
use super::time::SimTime;
use super::world::World;

/// 进程标识，由全局调度器分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u64);

/// 进程生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    NotStarted,
    Runnable,
    Blocked,
    Terminated,
}

/// 让出点：`resume` 返回时进程处于的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Yield {
    /// 阻塞 `d` 后由调度器重新激活
    BlockFor(SimTime),
    /// 无限期阻塞，直到被其他进程唤醒
    BlockIndefinitely,
    /// 正常结束
    Finished,
}

/// 协作式终止信号。进程用 `?` 把它一路传出 `resume`，调度器视为结束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("process {pid:?} was terminated")]
pub struct Terminated {
    pub pid: Pid,
}

/// 由全局调度器驱动的执行单元
pub trait Process: Send {
    fn name(&self) -> &str;

    /// 被激活后执行，直到下一个让出点
    fn resume(&mut self, cx: &mut Context<'_>, world: &mut dyn World) -> Result<Yield, Terminated>;
}

/// 进程池中的登记信息
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    /// 最近一次被激活的时刻
    pub last_scheduled: SimTime,
    /// 每次让出都会递增；激活请求只对同一 epoch 有效
    pub(crate) epoch: u64,
    pub(crate) abort_requested: bool,
    pub(crate) joiners: Vec<Pid>,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            state: ProcessState::NotStarted,
            last_scheduled: SimTime::ZERO,
            epoch: 0,
            abort_requested: false,
            joiners: Vec::new(),
        }
    }

    pub fn abort_requested(&self) -> bool {
        self.abort_requested
    }
}

/// 正在运行的进程看到的调度器视图（绑定了自己的 pid）
pub struct Context<'a> {
    sched: &'a mut dyn Scheduler,
    pid: Pid,
}

impl<'a> Context<'a> {
    pub fn new(sched: &'a mut dyn Scheduler, pid: Pid) -> Self {
        Self { sched, pid }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn now(&self) -> SimTime {
        self.sched.current_time()
    }

    /// 请求立即激活另一个（阻塞中的）进程
    pub fn wake_up(&mut self, pid: Pid) {
        self.sched.activate_now(pid);
    }

    /// 启动一个新进程
    pub fn spawn(&mut self, process: Box<dyn Process>) -> Pid {
        self.sched.start(process)
    }

    /// 等待 `target` 结束：登记后应返回 `Yield::BlockIndefinitely`。
    /// `target` 已经不存在时返回 false。
    pub fn join_on(&mut self, target: Pid) -> bool {
        self.sched.join(self.pid, target)
    }

    /// 若本进程已被要求终止，返回终止信号
    pub fn check_terminated(&self) -> Result<(), Terminated> {
        match self.sched.get_from_pool(self.pid) {
            Some(handle) if !handle.abort_requested => Ok(()),
            _ => Err(Terminated { pid: self.pid }),
        }
    }
}

impl Scheduler for Context<'_> {
    fn current_time(&self) -> SimTime {
        self.sched.current_time()
    }

    fn activate_at(&mut self, delay: SimTime, pid: Pid) {
        self.sched.activate_at(delay, pid)
    }

    fn add_to_pool(&mut self, process: Box<dyn Process>) -> Pid {
        self.sched.add_to_pool(process)
    }

    fn remove_from_pool(&mut self, pid: Pid) -> Option<Box<dyn Process>> {
        self.sched.remove_from_pool(pid)
    }

    fn process_blocked_or_finished(&mut self, pid: Pid) {
        self.sched.process_blocked_or_finished(pid)
    }

    fn get_from_pool(&self, pid: Pid) -> Option<&ProcessHandle> {
        self.sched.get_from_pool(pid)
    }

    fn join(&mut self, waiter: Pid, target: Pid) -> bool {
        self.sched.join(waiter, target)
    }

    fn abort(&mut self, pid: Pid) {
        self.sched.abort(pid)
    }

    fn terminate(&mut self) {
        self.sched.terminate()
    }
}
