use super::{ReplayBuffer, Subject, SubjectState};

/// Replay policy remembering the most recent value.
pub struct Latest<Item>(Item);

impl<Item: Clone + Send + 'static> ReplayBuffer<Item> for Latest<Item> {
  #[inline]
  fn record(&mut self, value: &Item) { self.0 = value.clone(); }

  fn replay(&self, _: SubjectState) -> Vec<Item> { vec![self.0.clone()] }
}

/// A new subscriber first receives the most recent value, seeded with an
/// initial one, then the live values.
///
/// Once terminated, late subscribers receive the last value followed by the
/// terminal signal.
pub type BehaviorSubject<Item, Err> = Subject<Item, Err, Latest<Item>>;

impl<Item, Err> Subject<Item, Err, Latest<Item>> {
  pub fn new(initial: Item) -> Self { Self::with_buffer(Latest(initial)) }

  /// The most recent value.
  pub fn value(&self) -> Item
  where
    Item: Clone,
  {
    self.inner.rc_deref_mut().buffer.0.clone()
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;

  fn collect(subject: &BehaviorSubject<i32, ()>, ctx: &ExecutionContext) -> MutArc<Vec<i32>> {
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    subject
      .clone()
      .subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), ctx);
    seen
  }

  #[rxflow_macro::test]
  fn first_subscriber_gets_the_seed() {
    let scheduler = TestScheduler::new();
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let seen = collect(&subject, &scheduler.context());
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![0]);
  }

  #[rxflow_macro::test]
  fn late_subscriber_gets_latest_then_live() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let mut input = subject.clone();
    let _ = input.next(1);
    let _ = input.next(2);
    assert_eq!(subject.value(), 2);

    let seen = collect(&subject, &ctx);
    let _ = input.next(3);
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![2, 3]);
  }

  #[rxflow_macro::test]
  fn after_completion_replays_latest_then_completes() {
    let ctx = TestScheduler::new().context();
    let subject = BehaviorSubject::<i32, ()>::new(0);
    let mut input = subject.clone();
    let _ = input.next(7);
    input.complete();

    let log = MutArc::own(vec![]);
    let (n, c) = (log.clone(), log.clone());
    subject.clone().subscribe(
      crate::observer::ObserverAll::new(
        move |v| n.rc_deref_mut().push(v),
        |_: ()| {},
        move || c.rc_deref_mut().push(-1),
      ),
      &ctx,
    );
    assert_eq!(*log.rc_deref_mut(), vec![7, -1]);
  }
}
