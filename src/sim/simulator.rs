//! 全局调度器
//!
//! 维护仿真时钟与全局激活队列，按“同一时刻一批”推进：
//! 1. 取出所有时间等于最小待处理时间的激活请求（一个 cohort）
//! 2. 把时钟推进到该时刻，逐个恢复 cohort 中的进程
//! 3. cohort 中每个进程都阻塞或结束之后（屏障释放）才计算下一个最小时间
//!
//! 同一时刻内由零时延因果链产生的新激活会形成新的 cohort，时钟保持不动，
//! 直到该时刻的所有反应都处理完毕。

use super::activation::Activation;
use super::process::{Context, Pid, Process, ProcessHandle, ProcessState, Yield};
use super::scheduler::Scheduler;
use super::time::SimTime;
use super::world::World;
use std::collections::{BTreeMap, BinaryHeap};
use tracing::{debug, info, trace, warn};

struct PoolEntry {
    handle: ProcessHandle,
    /// 运行期间被取出，`None` 表示正在 `resume` 中
    process: Option<Box<dyn Process>>,
}

/// 全局调度器：时钟、激活队列、进程池。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    next_pid: u64,
    q: BinaryHeap<Activation>,
    pool: BTreeMap<Pid, PoolEntry>,
    /// 当前 cohort 中尚未让出的进程数
    outstanding: usize,
    cohorts: u64,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已处理的 cohort 数
    pub fn cohorts(&self) -> u64 {
        self.cohorts
    }

    /// 当前 cohort 中尚未让出的进程数（屏障计数）
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// 进程池中的进程数
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// 待处理的激活请求数（可能包含过期请求）
    pub fn pending_activations(&self) -> usize {
        self.q.len()
    }

    /// 运行直到没有激活请求，或下一个 cohort 晚于 `until`。
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        while self.step(Some(until), world) {}
        self.now = self.now.max(until);
    }

    /// 运行直到没有任何激活请求。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, pool = self.pool.len(), pending = self.q.len(), "初始状态");

        while self.step(None, world) {}

        info!(
            total_cohorts = self.cohorts,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
    }

    /// 处理一个 cohort；没有可处理的激活时返回 false。
    fn step(&mut self, until: Option<SimTime>, world: &mut dyn World) -> bool {
        let Some(at) = self.q.peek().map(|a| a.at) else {
            return false;
        };
        if until.is_some_and(|u| at > u) {
            return false;
        }
        debug_assert!(at >= self.now, "activation in the past");

        let cohort = self.pop_cohort(at);
        if cohort.is_empty() {
            // 只剩过期请求，时钟不动
            return true;
        }

        self.now = at;
        self.cohorts += 1;
        self.outstanding = cohort.len();
        debug!(now = ?self.now, members = cohort.len(), "🕐 恢复 cohort");

        for pid in cohort {
            self.resume(pid, world);
        }

        // 单执行器下每次 resume 返回即让出；计数不为零说明记账出错。
        assert_eq!(self.outstanding, 0, "cohort barrier released early");
        world.on_tick(self);
        true
    }

    /// 取出所有时间等于 `at` 的激活请求，过滤掉过期的，并去重。
    fn pop_cohort(&mut self, at: SimTime) -> Vec<Pid> {
        let mut cohort = Vec::new();
        while self.q.peek().is_some_and(|a| a.at == at) {
            let a = self.q.pop().expect("peek then pop");
            let Some(entry) = self.pool.get_mut(&a.pid) else {
                trace!(pid = ?a.pid, "进程已不在池中，忽略激活");
                continue;
            };
            let handle = &mut entry.handle;
            let waiting = matches!(
                handle.state,
                ProcessState::NotStarted | ProcessState::Blocked
            );
            if handle.epoch != a.epoch || !waiting {
                trace!(pid = ?a.pid, seq = a.seq, "过期激活");
                continue;
            }
            handle.state = ProcessState::Runnable;
            cohort.push(a.pid);
        }
        cohort
    }

    fn resume(&mut self, pid: Pid, world: &mut dyn World) {
        let now = self.now;
        let Some(entry) = self.pool.get_mut(&pid) else {
            // 同一 cohort 中更早运行的进程把它移除了
            self.process_blocked_or_finished(pid);
            return;
        };
        let mut process = entry
            .process
            .take()
            .unwrap_or_else(|| panic!("process {pid:?} resumed re-entrantly"));
        entry.handle.last_scheduled = now;
        trace!(pid = ?pid, name = process.name(), "恢复进程");

        let outcome = {
            let mut cx = Context::new(self, pid);
            process.resume(&mut cx, world)
        };
        self.settle(pid, process, outcome);
    }

    /// 根据让出结果更新进程状态，然后报告屏障。
    fn settle(
        &mut self,
        pid: Pid,
        process: Box<dyn Process>,
        outcome: Result<Yield, super::process::Terminated>,
    ) {
        let now = self.now;
        let Some(entry) = self.pool.get_mut(&pid) else {
            debug!(pid = ?pid, name = process.name(), "进程运行期间被移出进程池");
            self.process_blocked_or_finished(pid);
            return;
        };

        let outcome = match outcome {
            Ok(Yield::BlockFor(_) | Yield::BlockIndefinitely) if entry.handle.abort_requested => {
                debug!(pid = ?pid, "已请求终止的进程试图继续阻塞，视为结束");
                Ok(Yield::Finished)
            }
            other => other,
        };

        match outcome {
            Ok(Yield::BlockFor(d)) => {
                entry.handle.state = ProcessState::Blocked;
                entry.handle.epoch += 1;
                entry.process = Some(process);
                trace!(pid = ?pid, wake_at = ?now.saturating_add(d), "进程定时阻塞");
                self.activate_at(d, pid);
            }
            Ok(Yield::BlockIndefinitely) => {
                entry.handle.state = ProcessState::Blocked;
                entry.handle.epoch += 1;
                entry.process = Some(process);
                trace!(pid = ?pid, "进程无限期阻塞");
            }
            Ok(Yield::Finished) | Err(_) => {
                let entry = self.pool.remove(&pid).expect("entry checked above");
                let mut handle = entry.handle;
                handle.state = ProcessState::Terminated;
                debug!(pid = ?pid, name = %handle.name, joiners = handle.joiners.len(), "进程结束");
                for joiner in handle.joiners.drain(..) {
                    self.activate_now(joiner);
                }
            }
        }
        self.process_blocked_or_finished(pid);
    }
}

impl Scheduler for Simulator {
    fn current_time(&self) -> SimTime {
        self.now
    }

    fn activate_at(&mut self, delay: SimTime, pid: Pid) {
        let Some(entry) = self.pool.get(&pid) else {
            warn!(pid = ?pid, "激活不存在的进程，忽略");
            return;
        };
        let at = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(Activation {
            at,
            seq,
            pid,
            epoch: entry.handle.epoch,
        });
        trace!(pid = ?pid, at = ?at, seq, queue_size = self.q.len(), "激活请求入队");
    }

    fn add_to_pool(&mut self, process: Box<dyn Process>) -> Pid {
        let pid = Pid(self.next_pid);
        self.next_pid += 1;
        let handle = ProcessHandle::new(pid, process.name());
        debug!(pid = ?pid, name = %handle.name, "进程加入进程池");
        self.pool.insert(
            pid,
            PoolEntry {
                handle,
                process: Some(process),
            },
        );
        pid
    }

    fn remove_from_pool(&mut self, pid: Pid) -> Option<Box<dyn Process>> {
        let entry = self.pool.remove(&pid)?;
        debug!(pid = ?pid, name = %entry.handle.name, "进程移出进程池");
        entry.process
    }

    fn process_blocked_or_finished(&mut self, pid: Pid) {
        self.outstanding = self.outstanding.saturating_sub(1);
        trace!(pid = ?pid, outstanding = self.outstanding, "进程让出");
    }

    fn get_from_pool(&self, pid: Pid) -> Option<&ProcessHandle> {
        self.pool.get(&pid).map(|e| &e.handle)
    }

    fn join(&mut self, waiter: Pid, target: Pid) -> bool {
        match self.pool.get_mut(&target) {
            Some(entry) => {
                entry.handle.joiners.push(waiter);
                true
            }
            None => false,
        }
    }

    fn abort(&mut self, pid: Pid) {
        let Some(entry) = self.pool.get_mut(&pid) else {
            return;
        };
        debug!(pid = ?pid, name = %entry.handle.name, "请求终止进程");
        entry.handle.abort_requested = true;
        if entry.handle.state != ProcessState::Runnable {
            self.activate_now(pid);
        }
    }

    fn terminate(&mut self) {
        info!(pool = self.pool.len(), "终止所有进程");
        for (pid, entry) in std::mem::take(&mut self.pool) {
            debug!(pid = ?pid, name = %entry.handle.name, "进程被强制终止");
        }
        self.q.clear();
    }
}
