use std::collections::VecDeque;

use super::{ReplayBuffer, Subject, SubjectState};

/// Replay policy keeping every value.
pub struct History<Item>(Vec<Item>);

impl<Item: Clone + Send + 'static> ReplayBuffer<Item> for History<Item> {
  #[inline]
  fn record(&mut self, value: &Item) { self.0.push(value.clone()); }

  fn replay(&self, _: SubjectState) -> Vec<Item> { self.0.clone() }
}

/// Replay policy keeping the `capacity` most recent values.
pub struct BoundedHistory<Item> {
  capacity: usize,
  values: VecDeque<Item>,
}

impl<Item: Clone + Send + 'static> ReplayBuffer<Item> for BoundedHistory<Item> {
  fn record(&mut self, value: &Item) {
    if self.values.len() == self.capacity {
      self.values.pop_front();
    }
    self.values.push_back(value.clone());
  }

  fn replay(&self, _: SubjectState) -> Vec<Item> { self.values.iter().cloned().collect() }
}

/// A new subscriber receives the full history, then the live values.
pub type ReplaySubject<Item, Err> = Subject<Item, Err, History<Item>>;

/// Like [`ReplaySubject`], retaining only the most recent values.
pub type ReplayLimitedSubject<Item, Err> = Subject<Item, Err, BoundedHistory<Item>>;

impl<Item, Err> Subject<Item, Err, History<Item>> {
  pub fn new() -> Self { Self::with_history(Vec::new()) }

  /// A replay subject whose history starts with `initial`.
  pub fn with_history(initial: impl IntoIterator<Item = Item>) -> Self {
    Self::with_buffer(History(initial.into_iter().collect()))
  }
}

impl<Item, Err> Default for Subject<Item, Err, History<Item>> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Subject<Item, Err, BoundedHistory<Item>> {
  /// Capacities below 1 are treated as 1.
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self::with_buffer(BoundedHistory { capacity, values: VecDeque::with_capacity(capacity) })
  }
}

#[cfg(test)]
mod tests {
  use crate::{observer::ObserverAll, prelude::*};

  fn collect<R>(subject: &Subject<i32, &'static str, R>, ctx: &ExecutionContext) -> MutArc<Vec<i32>>
  where
    R: ReplayBuffer<i32>,
  {
    let seen = MutArc::own(vec![]);
    let (n, c) = (seen.clone(), seen.clone());
    subject.clone().subscribe(
      ObserverAll::new(
        move |v| n.rc_deref_mut().push(v),
        |_: &'static str| {},
        move || c.rc_deref_mut().push(-1),
      ),
      ctx,
    );
    seen
  }

  #[rxflow_macro::test]
  fn replays_full_history_then_live() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let subject = ReplaySubject::<i32, &'static str>::new();
    let mut input = subject.clone();
    let _ = input.next(1);
    let _ = input.next(2);

    let seen = collect(&subject, &ctx);
    let _ = input.next(3);
    input.complete();
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![1, 2, 3, -1]);
  }

  #[rxflow_macro::test]
  fn populated_history_comes_first() {
    let scheduler = TestScheduler::new();
    let subject = ReplaySubject::<i32, &'static str>::with_history([10, 20]);
    let mut input = subject.clone();
    let _ = input.next(1);

    let seen = collect(&subject, &scheduler.context());
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![10, 20, 1]);
  }

  #[rxflow_macro::test]
  fn limited_keeps_the_tail() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let subject = ReplayLimitedSubject::<i32, &'static str>::new(2);
    let mut input = subject.clone();
    for v in 1..=3 {
      let _ = input.next(v);
    }

    let seen = collect(&subject, &ctx);
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![2, 3]);

    let _ = input.next(4);
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![2, 3, 4]);
  }

  #[rxflow_macro::test]
  fn terminated_replay_then_terminal() {
    let ctx = TestScheduler::new().context();
    let subject = ReplaySubject::<i32, &'static str>::new();
    let mut input = subject.clone();
    let _ = input.next(1);
    input.complete();

    // The subject is frozen; the late subscriber drains it synchronously.
    let seen = collect(&subject, &ctx);
    assert_eq!(*seen.rc_deref_mut(), vec![1, -1]);
  }
}
