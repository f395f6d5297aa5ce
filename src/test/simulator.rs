use super::{DummyWorld, entries, new_log, script};
use crate::sim::{Pid, Scheduler, SimTime, Simulator, Yield};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn cohort_members_run_before_clock_advances() {
    let log = new_log();
    let mut sim = Simulator::default();
    for name in ["a", "b"] {
        let log = Arc::clone(&log);
        let mut left = 3;
        sim.start(script(name, move |cx, _| {
            log.lock().expect("log lock").push((cx.now().0, name));
            left -= 1;
            Ok(if left == 0 {
                Yield::Finished
            } else {
                Yield::BlockFor(SimTime(10))
            })
        }));
    }

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    assert_eq!(
        entries(&log),
        vec![(0, "a"), (0, "b"), (10, "a"), (10, "b"), (20, "a"), (20, "b")]
    );
    assert_eq!(sim.cohorts(), 3);
    assert_eq!(world.ticks, 3);
    assert_eq!(sim.now(), SimTime(20));
    assert_eq!(sim.pool_len(), 0);
    assert_eq!(sim.outstanding(), 0);
}

#[test]
fn zero_delay_wake_up_forms_a_new_cohort_at_the_same_time() {
    let log = new_log();
    let mut sim = Simulator::default();

    let sleeper_log = Arc::clone(&log);
    let sleeper = sim.start(script("sleeper", move |cx, _| {
        sleeper_log
            .lock()
            .expect("log lock")
            .push((cx.now().0, "sleeper"));
        Ok(Yield::BlockIndefinitely)
    }));

    let mut step = 0;
    sim.start(script("waker", move |cx, _| {
        step += 1;
        match step {
            1 => Ok(Yield::BlockFor(SimTime(5))),
            _ => {
                cx.wake_up(sleeper);
                Ok(Yield::Finished)
            }
        }
    }));

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    assert_eq!(entries(&log), vec![(0, "sleeper"), (5, "sleeper")]);
    // t=0, t=5 (waker), t=5 (sleeper)
    assert_eq!(sim.cohorts(), 3);
    assert_eq!(sim.now(), SimTime(5));
    assert_eq!(sim.pool_len(), 1);
}

#[test]
fn stale_activation_is_discarded_without_advancing_the_clock() {
    let log = new_log();
    let mut sim = Simulator::default();

    let sleeper_log = Arc::clone(&log);
    let mut step = 0;
    let sleeper = sim.start(script("sleeper", move |cx, _| {
        sleeper_log
            .lock()
            .expect("log lock")
            .push((cx.now().0, "sleeper"));
        step += 1;
        Ok(match step {
            1 => Yield::BlockFor(SimTime(100)),
            _ => Yield::BlockIndefinitely,
        })
    }));

    let mut step = 0;
    sim.start(script("waker", move |cx, _| {
        step += 1;
        match step {
            1 => Ok(Yield::BlockFor(SimTime(10))),
            _ => {
                cx.wake_up(sleeper);
                Ok(Yield::Finished)
            }
        }
    }));

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    assert_eq!(entries(&log), vec![(0, "sleeper"), (10, "sleeper")]);
    assert_eq!(sim.now(), SimTime(10));
    assert_eq!(sim.pending_activations(), 0);
    assert_eq!(sim.cohorts(), 3);
}

#[test]
fn duplicate_wake_ups_resume_a_process_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut sim = Simulator::default();

    let counter = Arc::clone(&runs);
    let target = sim.start(script("target", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Yield::BlockIndefinitely)
    }));

    let mut step = 0;
    sim.start(script("waker", move |cx, _| {
        step += 1;
        if step == 1 {
            return Ok(Yield::BlockFor(SimTime(1)));
        }
        cx.wake_up(target);
        cx.wake_up(target);
        cx.activate_now(target);
        Ok(Yield::Finished)
    }));

    sim.run(&mut DummyWorld::default());
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[test]
fn run_until_stops_before_later_cohorts() {
    let log = new_log();
    let mut sim = Simulator::default();
    let ticker_log = Arc::clone(&log);
    sim.start(script("ticker", move |cx, _| {
        ticker_log
            .lock()
            .expect("log lock")
            .push((cx.now().0, "tick"));
        Ok(Yield::BlockFor(SimTime(10)))
    }));

    let mut world = DummyWorld::default();
    sim.run_until(SimTime(35), &mut world);
    let times: Vec<u64> = entries(&log).into_iter().map(|(t, _)| t).collect();
    assert_eq!(times, vec![0, 10, 20, 30]);
    assert_eq!(sim.now(), SimTime(35));
    assert_eq!(sim.pending_activations(), 1);

    sim.run_until(SimTime(50), &mut world);
    let times: Vec<u64> = entries(&log).into_iter().map(|(t, _)| t).collect();
    assert_eq!(times, vec![0, 10, 20, 30, 40, 50]);
    assert_eq!(sim.now(), SimTime(50));
}

#[test]
fn activating_an_unknown_pid_is_ignored() {
    let mut sim = Simulator::default();
    sim.activate_at(SimTime(1), Pid(99));
    assert_eq!(sim.pending_activations(), 0);
    sim.run(&mut DummyWorld::default());
    assert_eq!(sim.now(), SimTime::ZERO);
    assert_eq!(sim.cohorts(), 0);
}

#[test]
fn terminate_clears_pool_and_pending_activations() {
    let mut sim = Simulator::default();
    sim.start(script("ticker", |_, _| Ok(Yield::BlockFor(SimTime(1)))));
    let mut step = 0;
    sim.start(script("terminator", move |cx, _| {
        step += 1;
        if step == 1 {
            return Ok(Yield::BlockFor(SimTime(5)));
        }
        cx.terminate();
        Ok(Yield::Finished)
    }));

    let mut world = DummyWorld::default();
    sim.run(&mut world);

    assert_eq!(sim.now(), SimTime(5));
    assert_eq!(sim.pool_len(), 0);
    assert_eq!(sim.pending_activations(), 0);
    assert_eq!(sim.outstanding(), 0);
}
