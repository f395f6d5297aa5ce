use super::{DummyWorld, entries, new_log, script};
use crate::sim::{Pid, ProcessState, Scheduler, SimTime, Simulator, Yield};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn process_handle_tracks_lifecycle() {
    let mut sim = Simulator::default();
    let pid = sim.start(script("idle", |_, _| Ok(Yield::BlockIndefinitely)));
    let handle = sim.get_from_pool(pid).expect("registered");
    assert_eq!(handle.state, ProcessState::NotStarted);
    assert_eq!(handle.name, "idle");

    sim.run_until(SimTime(3), &mut DummyWorld::default());
    let handle = sim.get_from_pool(pid).expect("still registered");
    assert_eq!(handle.state, ProcessState::Blocked);
    assert_eq!(handle.last_scheduled, SimTime::ZERO);
    assert!(!handle.abort_requested());

    assert!(sim.remove_from_pool(pid).is_some());
    assert!(sim.get_from_pool(pid).is_none());
}

#[test]
fn cohort_peers_are_runnable_until_they_yield() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut sim = Simulator::default();

    let a_seen = Arc::clone(&seen);
    sim.start(script("a", move |cx, _| {
        let b = cx.get_from_pool(Pid(1)).map(|h| h.state);
        a_seen.lock().expect("seen lock").push(("a sees b", b));
        Ok(Yield::BlockFor(SimTime(1)))
    }));
    let b_seen = Arc::clone(&seen);
    sim.start(script("b", move |cx, _| {
        let a = cx.get_from_pool(Pid(0)).map(|h| h.state);
        b_seen.lock().expect("seen lock").push(("b sees a", a));
        Ok(Yield::Finished)
    }));

    sim.run_until(SimTime::ZERO, &mut DummyWorld::default());
    assert_eq!(
        *seen.lock().expect("seen lock"),
        vec![
            ("a sees b", Some(ProcessState::Runnable)),
            ("b sees a", Some(ProcessState::Blocked)),
        ]
    );
}

#[test]
fn join_wakes_the_waiter_when_target_finishes() {
    let log = new_log();
    let mut sim = Simulator::default();

    let parent_log = Arc::clone(&log);
    let mut step = 0;
    sim.start(script("parent", move |cx, _| {
        step += 1;
        if step == 1 {
            let mut child_step = 0;
            let child = cx.spawn(script("child", move |_, _| {
                child_step += 1;
                Ok(match child_step {
                    1 => Yield::BlockFor(SimTime(7)),
                    _ => Yield::Finished,
                })
            }));
            assert!(cx.join_on(child));
            return Ok(Yield::BlockIndefinitely);
        }
        parent_log
            .lock()
            .expect("log lock")
            .push((cx.now().0, "parent resumed"));
        // 目标已经结束
        assert!(!cx.join_on(Pid(1)));
        Ok(Yield::Finished)
    }));

    sim.run(&mut DummyWorld::default());
    assert_eq!(entries(&log), vec![(7, "parent resumed")]);
    assert_eq!(sim.pool_len(), 0);
}

#[test]
fn abort_is_observed_at_the_next_check() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut sim = Simulator::default();

    let counter = Arc::clone(&runs);
    let looper = sim.start(script("looper", move |cx, _| {
        cx.check_terminated()?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Yield::BlockFor(SimTime(1)))
    }));

    let mut step = 0;
    sim.start(script("killer", move |cx, _| {
        step += 1;
        if step == 1 {
            return Ok(Yield::BlockFor(SimTime(3)));
        }
        cx.abort(looper);
        Ok(Yield::Finished)
    }));

    sim.run(&mut DummyWorld::default());
    // t=0,1,2 运行；t=3 检查到终止请求
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(sim.pool_len(), 0);
    assert_eq!(sim.now(), SimTime(3));
}

#[test]
fn aborted_process_that_blocks_again_is_finished() {
    let saw_abort = Arc::new(AtomicBool::new(false));
    let mut sim = Simulator::default();

    let flag = Arc::clone(&saw_abort);
    let stubborn = sim.start(script("stubborn", move |cx, _| {
        if cx
            .get_from_pool(cx.pid())
            .is_some_and(|h| h.abort_requested())
        {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(Yield::BlockIndefinitely)
    }));

    let mut step = 0;
    sim.start(script("killer", move |cx, _| {
        step += 1;
        if step == 1 {
            return Ok(Yield::BlockFor(SimTime(5)));
        }
        cx.abort(stubborn);
        Ok(Yield::Finished)
    }));

    sim.run(&mut DummyWorld::default());
    assert!(saw_abort.load(Ordering::SeqCst));
    assert_eq!(sim.pool_len(), 0);
    assert_eq!(sim.now(), SimTime(5));
}

#[test]
fn check_terminated_fails_for_unregistered_process() {
    let mut sim = Simulator::default();
    let outcome = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&outcome);
    sim.start(script("self-removing", move |cx, _| {
        let pid = cx.pid();
        cx.remove_from_pool(pid);
        *slot.lock().expect("slot lock") = Some(cx.check_terminated());
        Ok(Yield::Finished)
    }));

    sim.run(&mut DummyWorld::default());
    let outcome = outcome.lock().expect("slot lock").clone().expect("ran");
    assert_eq!(outcome.map_err(|t| t.pid), Err(Pid(0)));
    assert_eq!(sim.pool_len(), 0);
}
