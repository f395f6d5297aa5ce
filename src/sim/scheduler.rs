//! 调度器接口
//!
//! 全局调度器对外暴露的最小接口。本地实现是 `Simulator`；分布式场景下
//! 可以用一个远程代理实现同一个 trait 透明替换。

use super::process::{Pid, Process, ProcessHandle};
use super::time::SimTime;

pub trait Scheduler {
    /// 当前仿真时间
    fn current_time(&self) -> SimTime;

    /// 请求在 `now + delay` 激活进程
    fn activate_at(&mut self, delay: SimTime, pid: Pid);

    /// 请求在当前时刻激活进程
    fn activate_now(&mut self, pid: Pid) {
        self.activate_at(SimTime::ZERO, pid);
    }

    /// 登记进程并分配 pid（不激活）
    fn add_to_pool(&mut self, process: Box<dyn Process>) -> Pid;

    /// 从进程池移除；进程正在运行时只移除登记信息，返回 None
    fn remove_from_pool(&mut self, pid: Pid) -> Option<Box<dyn Process>>;

    /// 进程让出控制权（阻塞或结束）时调用，用于释放同一时刻的屏障
    fn process_blocked_or_finished(&mut self, pid: Pid);

    fn get_from_pool(&self, pid: Pid) -> Option<&ProcessHandle>;

    /// `waiter` 等待 `target` 结束；`target` 不存在时返回 false
    fn join(&mut self, waiter: Pid, target: Pid) -> bool;

    /// 请求进程协作式终止
    fn abort(&mut self, pid: Pid);

    /// 终止所有进程并清空进程池与激活队列
    fn terminate(&mut self);

    /// 登记并立即激活
    fn start(&mut self, process: Box<dyn Process>) -> Pid {
        let pid = self.add_to_pool(process);
        self.activate_now(pid);
        pid
    }
}
