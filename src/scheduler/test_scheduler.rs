//! Manually driven scheduler for deterministic tests.
//!
//! Spawned futures are queued and only polled when the test calls
//! [`TestScheduler::run_one`] or [`TestScheduler::run_until_idle`]. A future
//! that returns `Pending` is parked until its waker fires, at which point it
//! is queued again. Leaving the queue alone is how tests model a consumer
//! that cannot keep up with its producer.
//!
//! ```rust
//! use rxflow::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let ctx = scheduler.context();
//! ctx.spawn(async {});
//! assert_eq!(scheduler.pending(), 1);
//! scheduler.run_until_idle();
//! assert_eq!(scheduler.pending(), 0);
//! ```

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  task::Context,
};

use futures::{
  future::BoxFuture,
  task::{waker_ref, ArcWake},
};

use super::{ExecutionContext, Scheduler};
use crate::rc::MutArc;

type TaskQueue = MutArc<VecDeque<Arc<TestTask>>>;

struct TestTask {
  future: Mutex<Option<BoxFuture<'static, ()>>>,
  queue: TaskQueue,
}

impl ArcWake for TestTask {
  fn wake_by_ref(arc_self: &Arc<Self>) {
    arc_self
      .queue
      .rc_deref_mut()
      .push_back(arc_self.clone());
  }
}

/// A scheduler whose tasks run only when the test asks for it.
#[derive(Clone, Default)]
pub struct TestScheduler {
  queue: TaskQueue,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// An execution context spawning onto this scheduler.
  pub fn context(&self) -> ExecutionContext { ExecutionContext::new(self.clone()) }

  /// Number of tasks ready to be polled.
  pub fn pending(&self) -> usize { self.queue.rc_deref_mut().len() }

  /// Poll the oldest ready task once. Returns `false` if none was ready.
  pub fn run_one(&self) -> bool {
    let task = self.queue.rc_deref_mut().pop_front();
    let Some(task) = task else {
      return false;
    };
    let waker = waker_ref(&task);
    let mut cx = Context::from_waker(&waker);
    let mut slot = task
      .future
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(mut fut) = slot.take() {
      if fut.as_mut().poll(&mut cx).is_pending() {
        *slot = Some(fut);
      }
    }
    true
  }

  /// Poll ready tasks until none is left, returning how many polls ran.
  pub fn run_until_idle(&self) -> usize {
    let mut polls = 0;
    while self.run_one() {
      polls += 1;
    }
    polls
  }
}

impl Scheduler for TestScheduler {
  fn spawn(&self, task: BoxFuture<'static, ()>) {
    let task = Arc::new(TestTask {
      future: Mutex::new(Some(task)),
      queue: self.queue.clone(),
    });
    self.queue.rc_deref_mut().push_back(task);
  }
}

#[cfg(test)]
mod tests {
  use futures::channel::oneshot;

  use super::*;

  #[rxflow_macro::test]
  fn parked_task_resumes_after_wake() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let (tx, rx) = oneshot::channel::<i32>();
    let out = MutArc::own(None);
    let c_out = out.clone();
    ctx.spawn(async move {
      *c_out.rc_deref_mut() = rx.await.ok();
    });

    assert_eq!(scheduler.run_until_idle(), 1);
    assert_eq!(*out.rc_deref_mut(), None);
    assert_eq!(scheduler.pending(), 0);

    tx.send(7).unwrap();
    assert_eq!(scheduler.pending(), 1);
    scheduler.run_until_idle();
    assert_eq!(*out.rc_deref_mut(), Some(7));
  }

  #[rxflow_macro::test]
  fn tasks_run_in_spawn_order() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let log = MutArc::own(vec![]);
    for i in 0..3 {
      let log = log.clone();
      ctx.spawn(async move { log.rc_deref_mut().push(i) });
    }
    assert!(scheduler.run_one());
    assert_eq!(*log.rc_deref_mut(), vec![0]);
    scheduler.run_until_idle();
    assert_eq!(*log.rc_deref_mut(), vec![0, 1, 2]);
  }
}
