use std::marker::PhantomData;

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
};

/// Creates an observable that produces no values and completes immediately.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, PhantomData) }

/// Creates an observable that never emits anything.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

pub struct ThrowErr<Item, Err>(Err, PhantomData<fn() -> Item>);

pub struct Never<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { ThrowErr(self.0.clone(), PhantomData) }
}

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

macro_rules! observable_type {
  ($($ty:ident),*) => {
    $(
      impl<Item: Send + 'static, Err: Send + 'static> ObservableType for $ty<Item, Err> {
        type Item = Item;
        type Err = Err;
      }
    )*
  };
}

observable_type!(Empty, ThrowErr, Never);

impl<Item, Err, O> CoreObservable<O> for Empty<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, subscriber: Subscriber<O>) { subscriber.complete() }
}

impl<Item, Err, O> CoreObservable<O> for ThrowErr<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, subscriber: Subscriber<O>) { subscriber.error(self.0) }
}

impl<Item, Err, O> CoreObservable<O> for Never<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = ();

  fn actual_subscribe(self, _subscriber: Subscriber<O>) {}
}
