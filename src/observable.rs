//! Producer side of a stream.
//!
//! An observable is a value describing how to produce a stream. It does
//! nothing until subscribed, and subscribing consumes it; observables that
//! can be subscribed several times implement `Clone`.
//!
//! - [`ObservableType`] names the item and error types.
//! - [`CoreObservable`] is the raw subscription primitive operators build
//!   on. It performs no grammar checks.
//! - [`Observable`] is the user facing facade: `subscribe` wraps the
//!   observer in a [`SafeObserver`] and binds it to an explicit
//!   [`ExecutionContext`].

use std::sync::Arc;

use crate::{
  observer::{BoxedObserver, IntoBoxedObserver, Observer, SafeObserver},
  scheduler::ExecutionContext,
  subscriber::Subscriber,
  subscription::{BoxedSubscription, Subscription},
};

mod from_future;
mod from_iter;
mod of;
mod trivial;

pub use from_future::{from_future, FromFuture};
pub(crate) use from_iter::drive;
pub use from_iter::{from_iter, from_results, FromIter, FromResults};
pub use of::{of, Of};
pub use trivial::{empty, never, throw_err, Empty, Never, ThrowErr};

/// Item and error types of a producer.
pub trait ObservableType {
  type Item: Send + 'static;
  type Err: Send + 'static;
}

/// Raw subscription entry point.
///
/// Implemented for every observer type `O` the producer can feed, which lets
/// operators add bounds on the downstream observer per implementation.
pub trait CoreObservable<O>: ObservableType {
  type Unsub: Subscription + Send + 'static;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> Self::Unsub;
}

/// User facing subscription methods, available on every producer.
pub trait Observable: ObservableType + Sized {
  /// Subscribe `observer`, running deferred work on `ctx`.
  fn subscribe<O>(
    self, observer: O, ctx: &ExecutionContext,
  ) -> <Self as CoreObservable<SafeObserver<O>>>::Unsub
  where
    O: Observer<<Self as ObservableType>::Item, <Self as ObservableType>::Err>,
    Self: CoreObservable<SafeObserver<O>>,
  {
    self.actual_subscribe(Subscriber::new(SafeObserver::new(observer), ctx.clone()))
  }

  /// Erase the concrete type. The result can be subscribed once.
  fn box_it(self) -> BoxedObservable<<Self as ObservableType>::Item, <Self as ObservableType>::Err>
  where
    Self: CoreObservable<BoxedObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>
      + Send
      + 'static,
  {
    BoxedObservable::new(self)
  }

  /// Erase the concrete type of a re-subscribable producer.
  fn into_shared(
    self,
  ) -> SharedObservable<<Self as ObservableType>::Item, <Self as ObservableType>::Err>
  where
    Self: CoreObservable<BoxedObserver<<Self as ObservableType>::Item, <Self as ObservableType>::Err>>
      + Clone
      + Send
      + Sync
      + 'static,
  {
    SharedObservable::new(self)
  }
}

impl<T: ObservableType> Observable for T {}

// ============================================================================
// Boxed observables
// ============================================================================

/// Object safe form of [`CoreObservable`] over boxed observers.
pub trait DynCoreObservable<Item, Err>: Send {
  fn box_subscribe(self: Box<Self>, subscriber: Subscriber<BoxedObserver<Item, Err>>)
    -> BoxedSubscription;
}

impl<T, Item, Err> DynCoreObservable<Item, Err> for T
where
  T: CoreObservable<BoxedObserver<Item, Err>, Item = Item, Err = Err> + Send,
{
  fn box_subscribe(
    self: Box<Self>, subscriber: Subscriber<BoxedObserver<Item, Err>>,
  ) -> BoxedSubscription {
    BoxedSubscription::new((*self).actual_subscribe(subscriber))
  }
}

/// A type erased producer that can be subscribed exactly once.
///
/// Subscribing consumes the value and the type is not `Clone`, so a second
/// subscription to the same instance cannot be written.
pub struct BoxedObservable<Item, Err>(Box<dyn DynCoreObservable<Item, Err>>);

/// Output of [`Pipe::unicast`](crate::pipe::Pipe::unicast).
pub type UnicastObservable<Item, Err> = BoxedObservable<Item, Err>;

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: CoreObservable<BoxedObserver<Item, Err>, Item = Item, Err = Err> + Send + 'static,
  {
    Self(Box::new(source))
  }
}

impl<Item: Send + 'static, Err: Send + 'static> ObservableType for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for BoxedObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = BoxedSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BoxedSubscription {
    self.0.box_subscribe(subscriber.transform(IntoBoxedObserver::into_boxed))
  }
}

type SubscribeFn<Item, Err> =
  dyn Fn(Subscriber<BoxedObserver<Item, Err>>) -> BoxedSubscription + Send + Sync;

/// A type erased producer that can be subscribed any number of times.
pub struct SharedObservable<Item, Err>(Arc<SubscribeFn<Item, Err>>);

impl<Item, Err> Clone for SharedObservable<Item, Err> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item: Send + 'static, Err: Send + 'static> SharedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: CoreObservable<BoxedObserver<Item, Err>, Item = Item, Err = Err>
      + Clone
      + Send
      + Sync
      + 'static,
  {
    Self(Arc::new(move |subscriber| {
      BoxedSubscription::new(source.clone().actual_subscribe(subscriber))
    }))
  }
}

impl<Item: Send + 'static, Err: Send + 'static> ObservableType for SharedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> CoreObservable<O> for SharedObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = BoxedSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BoxedSubscription {
    (self.0)(subscriber.transform(IntoBoxedObserver::into_boxed))
  }
}
