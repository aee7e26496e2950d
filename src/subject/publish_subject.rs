use super::{ReplayBuffer, Subject, SubjectState};

/// Replay policy remembering nothing.
pub struct NoReplay;

impl<Item> ReplayBuffer<Item> for NoReplay {
  #[inline]
  fn record(&mut self, _: &Item) {}

  #[inline]
  fn replay(&self, _: SubjectState) -> Vec<Item> { Vec::new() }
}

/// Subscribers see only the values pushed after they joined.
pub type PublishSubject<Item, Err> = Subject<Item, Err, NoReplay>;

impl<Item, Err> Subject<Item, Err, NoReplay> {
  pub fn new() -> Self { Self::with_buffer(NoReplay) }
}

impl<Item, Err> Default for Subject<Item, Err, NoReplay> {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use crate::{ack::AckFuture, observer::ObserverAll, prelude::*};

  type Log = MutArc<Vec<Result<Option<i32>, &'static str>>>;

  fn recorder(log: &Log) -> impl Observer<i32, &'static str> {
    let (n, e, c) = (log.clone(), log.clone(), log.clone());
    ObserverAll::new(
      move |v| n.rc_deref_mut().push(Ok(Some(v))),
      move |err| e.rc_deref_mut().push(Err(err)),
      move || c.rc_deref_mut().push(Ok(None)),
    )
  }

  #[rxflow_macro::test]
  fn late_subscriber_sees_only_new_values() {
    let ctx = TestScheduler::new().context();
    let subject = PublishSubject::<i32, &'static str>::new();
    let (early, late): (Log, Log) = (MutArc::own(vec![]), MutArc::own(vec![]));

    subject.clone().subscribe(recorder(&early), &ctx);
    let mut input = subject.clone();
    let _ = input.next(1);
    subject.clone().subscribe(recorder(&late), &ctx);
    let _ = input.next(2);
    input.complete();

    assert_eq!(*early.rc_deref_mut(), vec![Ok(Some(1)), Ok(Some(2)), Ok(None)]);
    assert_eq!(*late.rc_deref_mut(), vec![Ok(Some(2)), Ok(None)]);
  }

  #[rxflow_macro::test]
  fn terminated_subject_only_replays_the_terminal() {
    let ctx = TestScheduler::new().context();
    let subject = PublishSubject::<i32, &'static str>::new();
    let mut input = subject.clone();
    let _ = input.next(1);
    input.clone().error("boom");

    assert_eq!(input.next(2).now(), Some(Ack::Stop));
    assert_eq!(subject.state(), SubjectState::Erred);

    let late: Log = MutArc::own(vec![]);
    subject.clone().subscribe(recorder(&late), &ctx);
    assert_eq!(*late.rc_deref_mut(), vec![Err("boom")]);
  }

  #[rxflow_macro::test]
  fn unsubscribe_removes_the_observer() {
    let ctx = TestScheduler::new().context();
    let subject = PublishSubject::<i32, &'static str>::new();
    let log: Log = MutArc::own(vec![]);
    let subscription = subject.clone().subscribe(recorder(&log), &ctx);
    assert_eq!(subject.observer_count(), 1);

    subscription.unsubscribe();
    assert_eq!(subject.observer_count(), 0);
    let _ = subject.clone().next(1);
    assert!(log.rc_deref_mut().is_empty());
  }

  struct StopAt(i32);

  impl Observer<i32, &'static str> for StopAt {
    fn next(&mut self, value: i32) -> AckFuture {
      if value >= self.0 { AckFuture::stop_now() } else { AckFuture::continue_now() }
    }

    fn error(self, _: &'static str) {}

    fn complete(self) {}

    fn is_closed(&self) -> bool { false }
  }

  #[rxflow_macro::test]
  fn stopping_subscribers_are_removed() {
    let ctx = TestScheduler::new().context();
    let subject = PublishSubject::<i32, &'static str>::new();
    subject.clone().subscribe(StopAt(2), &ctx);
    subject.clone().subscribe(StopAt(3), &ctx);

    let mut input = subject.clone();
    let _ = input.next(2);
    assert_eq!(subject.observer_count(), 1);
    // With nobody left the subject keeps accepting values.
    assert_eq!(input.next(3).now(), Some(Ack::Continue));
    assert_eq!(subject.observer_count(), 0);
    assert_eq!(input.next(4).now(), Some(Ack::Continue));
  }

  #[rxflow_macro::test]
  fn waits_for_every_deferred_ack() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let subject = PublishSubject::<i32, &'static str>::new();
    let log: Log = MutArc::own(vec![]);
    subject
      .clone()
      .concat_map(|v| from_future(async move { Ok::<_, &'static str>(v) }))
      .subscribe(recorder(&log), &ctx);

    let mut ack = subject.clone().next(1);
    assert_eq!(ack.now(), None);
    scheduler.run_until_idle();
    assert_eq!(futures::executor::block_on(&mut ack), Ack::Continue);
    assert_eq!(*log.rc_deref_mut(), vec![Ok(Some(1))]);
  }
}
