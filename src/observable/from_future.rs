use std::future::Future;

use crate::{
  ack::Ack,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{BooleanSubscription, Subscription},
};

/// Converts a future resolving to a `Result` into a single-value observable.
///
/// The future runs on the subscriber's execution context. `Ok(v)` is emitted
/// and followed by completion; `Err(e)` terminates the stream with `e`.
pub fn from_future<F, Item, Err>(future: F) -> FromFuture<F>
where
  F: Future<Output = Result<Item, Err>>,
{
  FromFuture(future)
}

#[derive(Clone)]
pub struct FromFuture<F>(F);

impl<F, Item, Err> ObservableType for FromFuture<F>
where
  F: Future<Output = Result<Item, Err>>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;
}

impl<F, Item, Err, O> CoreObservable<O> for FromFuture<F>
where
  F: Future<Output = Result<Item, Err>> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = BooleanSubscription;

  fn actual_subscribe(self, mut subscriber: Subscriber<O>) -> BooleanSubscription {
    let cancel = BooleanSubscription::new();
    let c_cancel = cancel.clone();
    let ctx = subscriber.context().clone();
    let future = self.0;
    ctx.spawn(async move {
      let result = future.await;
      if c_cancel.is_closed() {
        return;
      }
      match result {
        Ok(value) => {
          if subscriber.next(value).await == Ack::Continue && !c_cancel.is_closed() {
            subscriber.complete();
          }
        }
        Err(err) => subscriber.error(err),
      }
    });
    cancel
  }
}

#[cfg(test)]
mod tests {
  use futures::future;

  use super::*;
  use crate::{observable::Observable, observer::ObserverAll, rc::MutArc, scheduler::TestScheduler};

  #[rxflow_macro::test]
  fn emits_on_context() {
    let scheduler = TestScheduler::new();
    let log = MutArc::own(vec![]);
    let (c_log, d_log) = (log.clone(), log.clone());
    from_future(future::ready(Ok::<_, ()>(5))).subscribe(
      ObserverAll::new(
        move |v| c_log.rc_deref_mut().push(v),
        |_: ()| {},
        move || d_log.rc_deref_mut().push(0),
      ),
      &scheduler.context(),
    );

    assert!(log.rc_deref_mut().is_empty());
    scheduler.run_until_idle();
    assert_eq!(*log.rc_deref_mut(), vec![5, 0]);
  }

  #[rxflow_macro::test]
  fn cancelled_future_emits_nothing() {
    let scheduler = TestScheduler::new();
    let log = MutArc::own(vec![]);
    let c_log = log.clone();
    let subscription = from_future(future::ready(Err::<i32, _>("boom"))).subscribe(
      ObserverAll::new(|_: i32| {}, move |e: &'static str| c_log.rc_deref_mut().push(e), || {}),
      &scheduler.context(),
    );
    subscription.unsubscribe();
    scheduler.run_until_idle();
    assert!(log.rc_deref_mut().is_empty());
  }
}
