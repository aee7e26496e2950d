use std::marker::PhantomData;

use crate::{
  ack::{Ack, AckFuture},
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{BooleanSubscription, Subscription},
};

/// Creates an observable that produces values from an iterator.
///
/// Values are sent one at a time, each only after the previous one was
/// acknowledged. Completes once the iterator is exhausted. Never emits an
/// error.
pub fn from_iter<I, Err>(iter: I) -> FromIter<I::IntoIter, Err>
where
  I: IntoIterator,
{
  FromIter { iter: iter.into_iter(), _err: PhantomData }
}

/// Creates an observable from an iterator of results.
///
/// `Ok` values are emitted in order; the first `Err` terminates the stream
/// with that error.
pub fn from_results<I, Item, Err>(iter: I) -> FromResults<I::IntoIter>
where
  I: IntoIterator<Item = Result<Item, Err>>,
{
  FromResults(iter.into_iter())
}

pub struct FromIter<I, Err> {
  iter: I,
  _err: PhantomData<fn() -> Err>,
}

impl<I: Clone, Err> Clone for FromIter<I, Err> {
  fn clone(&self) -> Self { Self { iter: self.iter.clone(), _err: PhantomData } }
}

impl<I, Err> ObservableType for FromIter<I, Err>
where
  I: Iterator,
  I::Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = I::Item;
  type Err = Err;
}

impl<I, Err, O> CoreObservable<O> for FromIter<I, Err>
where
  I: Iterator + Send + 'static,
  I::Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<I::Item, Err>,
{
  type Unsub = BooleanSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BooleanSubscription {
    let cancel = BooleanSubscription::new();
    drive(self.iter.map(Ok::<I::Item, Err>), subscriber, cancel.clone());
    cancel
  }
}

#[derive(Clone)]
pub struct FromResults<I>(I);

impl<I, Item, Err> ObservableType for FromResults<I>
where
  I: Iterator<Item = Result<Item, Err>>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;
}

impl<I, Item, Err, O> CoreObservable<O> for FromResults<I>
where
  I: Iterator<Item = Result<Item, Err>> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = BooleanSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BooleanSubscription {
    let cancel = BooleanSubscription::new();
    drive(self.0, subscriber, cancel.clone());
    cancel
  }
}

/// Emit `iter` into `subscriber` honouring acks.
///
/// Runs synchronously while acks are immediate. On a deferred ack the rest
/// of the iteration continues on the subscriber's execution context once the
/// ack resolved.
pub(crate) fn drive<I, Item, Err, O>(
  mut iter: I, mut subscriber: Subscriber<O>, cancel: BooleanSubscription,
) where
  I: Iterator<Item = Result<Item, Err>> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  loop {
    if cancel.is_closed() {
      return;
    }
    let value = match iter.next() {
      None => return subscriber.complete(),
      Some(Err(err)) => return subscriber.error(err),
      Some(Ok(value)) => value,
    };
    match subscriber.next(value) {
      AckFuture::Now(Ack::Continue) => continue,
      AckFuture::Now(Ack::Stop) => return,
      AckFuture::Later(ack) => {
        let ctx = subscriber.context().clone();
        ctx.spawn(async move {
          if ack.await == Ack::Continue {
            drive(iter, subscriber, cancel);
          }
        });
        return;
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    observable::Observable,
    observer::ObserverAll,
    rc::MutArc,
    scheduler::{ExecutionContext, TestScheduler},
  };

  struct Slow {
    log: MutArc<Vec<i32>>,
    ctx: ExecutionContext,
  }

  impl Observer<i32, &'static str> for Slow {
    fn next(&mut self, value: i32) -> AckFuture {
      self.log.rc_deref_mut().push(value);
      let (tx, rx) = futures::channel::oneshot::channel();
      self.ctx.spawn(async move {
        let _ = tx.send(Ack::Continue);
      });
      AckFuture::from_receiver(rx)
    }

    fn error(self, _: &'static str) {}

    fn complete(self) { self.log.rc_deref_mut().push(-1); }

    fn is_closed(&self) -> bool { false }
  }

  #[rxflow_macro::test]
  fn emits_all_then_completes() {
    let ctx = TestScheduler::new().context();
    let log = MutArc::own(vec![]);
    let (c_log, d_log) = (log.clone(), log.clone());
    from_iter::<_, ()>(0..3).subscribe(
      ObserverAll::new(
        move |v| c_log.rc_deref_mut().push(v),
        |_: ()| {},
        move || d_log.rc_deref_mut().push(-1),
      ),
      &ctx,
    );
    assert_eq!(*log.rc_deref_mut(), vec![0, 1, 2, -1]);
  }

  #[rxflow_macro::test]
  fn waits_for_deferred_acks() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let log = MutArc::own(vec![]);
    from_iter([1, 2, 3]).subscribe(Slow { log: log.clone(), ctx: ctx.clone() }, &ctx);

    assert_eq!(*log.rc_deref_mut(), vec![1]);
    scheduler.run_until_idle();
    assert_eq!(*log.rc_deref_mut(), vec![1, 2, 3, -1]);
  }

  #[rxflow_macro::test]
  fn first_error_terminates() {
    let ctx = TestScheduler::new().context();
    let log = MutArc::own(vec![]);
    let err = MutArc::own(None);
    let (c_log, c_err) = (log.clone(), err.clone());
    from_results(vec![Ok(1), Err("boom"), Ok(2)]).subscribe(
      ObserverAll::new(
        move |v| c_log.rc_deref_mut().push(v),
        move |e| *c_err.rc_deref_mut() = Some(e),
        || {},
      ),
      &ctx,
    );
    assert_eq!(*log.rc_deref_mut(), vec![1]);
    assert_eq!(*err.rc_deref_mut(), Some("boom"));
  }

  #[rxflow_macro::test]
  fn cancelled_before_resume_stops() {
    let scheduler = TestScheduler::new();
    let ctx = scheduler.context();
    let log = MutArc::own(vec![]);
    let subscription =
      from_iter([1, 2, 3]).subscribe(Slow { log: log.clone(), ctx: ctx.clone() }, &ctx);

    subscription.unsubscribe();
    scheduler.run_until_idle();
    assert_eq!(*log.rc_deref_mut(), vec![1]);
  }
}
