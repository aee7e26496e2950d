use std::marker::PhantomData;

use super::from_iter::drive;
use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::BooleanSubscription,
};

/// Creates an observable producing a single value, then completing.
pub fn of<T, Err>(value: T) -> Of<T, Err> { Of { value, _err: PhantomData } }

pub struct Of<T, Err> {
  value: T,
  _err: PhantomData<fn() -> Err>,
}

impl<T: Clone, Err> Clone for Of<T, Err> {
  fn clone(&self) -> Self { of(self.value.clone()) }
}

impl<T: Send + 'static, Err: Send + 'static> ObservableType for Of<T, Err> {
  type Item = T;
  type Err = Err;
}

impl<T, Err, O> CoreObservable<O> for Of<T, Err>
where
  T: Send + 'static,
  Err: Send + 'static,
  O: Observer<T, Err>,
{
  type Unsub = BooleanSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BooleanSubscription {
    let cancel = BooleanSubscription::new();
    drive(std::iter::once(Ok(self.value)), subscriber, cancel.clone());
    cancel
  }
}
