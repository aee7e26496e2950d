use crate::{
  ack::AckFuture,
  observer::Observer,
  ops::{ApplyOperator, Operator},
  subscriber::Subscriber,
};

/// Applies a function to every value; completion and errors pass through
/// untouched.
#[derive(Clone)]
pub struct MapOp<F> {
  func: F,
}

impl<F> MapOp<F> {
  pub fn new(func: F) -> Self { Self { func } }
}

impl<In, InErr, B, F> Operator<In, InErr> for MapOp<F>
where
  F: FnMut(In) -> B + Send + 'static,
  B: Send + 'static,
  InErr: Send + 'static,
{
  type Out = B;
  type OutErr = InErr;
}

impl<In, InErr, B, F, O> ApplyOperator<In, InErr, O> for MapOp<F>
where
  F: FnMut(In) -> B + Send + 'static,
  B: Send + 'static,
  InErr: Send + 'static,
  O: Observer<B, InErr>,
{
  type Upstream = MapObserver<O, F>;
  type Teardown = ();

  fn apply(self, downstream: Subscriber<O>) -> (Subscriber<MapObserver<O, F>>, ()) {
    let func = self.func;
    (downstream.transform(|observer| MapObserver { observer, func }), ())
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) -> AckFuture { self.observer.next((self.func)(value)) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use crate::{
    error::RxError,
    observer::ObserverAll,
    prelude::*,
  };

  #[rxflow_macro::test]
  fn maps_values() {
    let ctx = TestScheduler::new().context();
    let sum = MutArc::own(0);
    let c_sum = sum.clone();
    from_iter::<_, ()>(100..101)
      .map(|v| v * 2)
      .subscribe(FnMutObserver(move |v| *c_sum.rc_deref_mut() += v), &ctx);
    assert_eq!(*sum.rc_deref_mut(), 200);
  }

  #[rxflow_macro::test]
  fn forwards_terminals_untouched() {
    let ctx = TestScheduler::new().context();
    let log = MutArc::own(vec![]);
    let c_log = log.clone();
    let err = MutArc::own(None);
    let c_err = err.clone();
    from_results(vec![Ok(1), Err(RxError::source_error("boom"))])
      .map(|v: i32| v.to_string())
      .subscribe(
        ObserverAll::new(
          move |v: String| c_log.rc_deref_mut().push(v),
          move |e| *c_err.rc_deref_mut() = Some(e),
          || {},
        ),
        &ctx,
      );
    assert_eq!(*log.rc_deref_mut(), vec!["1".to_string()]);
    assert_eq!(*err.rc_deref_mut(), Some(RxError::source_error("boom")));
  }

  #[rxflow_macro::test]
  fn completion_passes_through() {
    let ctx = TestScheduler::new().context();
    let done = MutArc::own(false);
    let c_done = done.clone();
    empty::<i32, ()>()
      .map(|v| v + 1)
      .subscribe(
        ObserverAll::new(|_: i32| {}, |_: ()| {}, move || *c_done.rc_deref_mut() = true),
        &ctx,
      );
    assert!(*done.rc_deref_mut());
  }
}
