//! Combinators available on every producer.
//!
//! Every method reduces to [`ProducerLike::lift`]: it builds an operator and
//! lifts it onto `self`. Nothing is subscribed until the resulting producer
//! is.

use std::future::Future;

use crate::{
  observable::ObservableType,
  ops::{ConcatMapOp, DelayErrors, FailFast, Lifted, MapOp, Operator, ViaFuture},
};

/// Producer returned by `flatten` and `concat`.
pub type Flatten<S> = Lifted<
  S,
  ConcatMapOp<fn(<S as ObservableType>::Item) -> <S as ObservableType>::Item, FailFast>,
>;

pub trait ProducerLike: ObservableType + Sized {
  /// Apply `op` to this producer.
  ///
  /// `source.lift(f).lift(g)` is observably the same as
  /// `source.lift(compose(f, g))`.
  #[inline]
  fn lift<Op>(self, op: Op) -> Lifted<Self, Op>
  where
    Op: Operator<Self::Item, Self::Err>,
  {
    Lifted::new(self, op)
  }

  /// Apply `f` to every value.
  #[inline]
  fn map<B, F>(self, f: F) -> Lifted<Self, MapOp<F>>
  where
    F: FnMut(Self::Item) -> B + Send + 'static,
    B: Send + 'static,
  {
    self.lift(MapOp::new(f))
  }

  /// Map every value to an inner producer and forward the inner outputs one
  /// after the other, never interleaved.
  ///
  /// The first error, from upstream or an inner producer, cancels the
  /// active inner subscription and is forwarded right away.
  ///
  /// ```rust
  /// use rxflow::prelude::*;
  ///
  /// let ctx = TestScheduler::new().context();
  /// let seen = MutArc::own(vec![]);
  /// let c_seen = seen.clone();
  /// from_iter::<_, ()>([1, 2])
  ///   .concat_map(|v| from_iter::<_, ()>([v, v * 10]))
  ///   .subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), &ctx);
  /// assert_eq!(*seen.rc_deref_mut(), vec![1, 10, 2, 20]);
  /// ```
  #[inline]
  fn concat_map<F, Inner>(self, f: F) -> Lifted<Self, ConcatMapOp<F, FailFast>>
  where
    F: FnMut(Self::Item) -> Inner + Send + 'static,
    Inner: ObservableType<Err = Self::Err>,
  {
    self.lift(ConcatMapOp::new(f))
  }

  /// Like [`concat_map`](ProducerLike::concat_map), with every error held
  /// back until the upstream terminated and the active inner producer
  /// finished. The distinct causes are then emitted together, in encounter
  /// order, as one [`CompositeError`](crate::error::CompositeError). Completes normally if nothing failed.
  #[inline]
  fn concat_map_delay_error<F, Inner>(self, f: F) -> Lifted<Self, ConcatMapOp<F, DelayErrors>>
  where
    F: FnMut(Self::Item) -> Inner + Send + 'static,
    Inner: ObservableType<Err = Self::Err>,
    Self::Err: PartialEq,
  {
    self.lift(ConcatMapOp::new(f))
  }

  /// Alias of [`concat_map`](ProducerLike::concat_map). Inner producers
  /// run one at a time; this is not a concurrent merge.
  #[inline]
  fn flat_map<F, Inner>(self, f: F) -> Lifted<Self, ConcatMapOp<F, FailFast>>
  where
    F: FnMut(Self::Item) -> Inner + Send + 'static,
    Inner: ObservableType<Err = Self::Err>,
  {
    self.concat_map(f)
  }

  /// Concatenate a producer of producers.
  #[inline]
  fn flatten(self) -> Flatten<Self>
  where
    Self::Item: ObservableType<Err = Self::Err>,
  {
    fn identity<T>(value: T) -> T { value }
    let identity: fn(Self::Item) -> Self::Item = identity;
    self.lift(ConcatMapOp::new(identity))
  }

  /// Alias of [`flatten`](ProducerLike::flatten).
  #[inline]
  fn concat(self) -> Flatten<Self>
  where
    Self::Item: ObservableType<Err = Self::Err>,
  {
    self.flatten()
  }

  /// Map every value to a future and emit the results one at a time, in
  /// upstream order. The futures run on the subscription's context; an
  /// `Err` ends the stream.
  #[inline]
  fn concat_map_future<F, Fut, B>(self, f: F) -> Lifted<Self, ConcatMapOp<F, FailFast, ViaFuture>>
  where
    F: FnMut(Self::Item) -> Fut + Send + 'static,
    Fut: Future<Output = Result<B, Self::Err>>,
    B: Send + 'static,
  {
    self.lift(ConcatMapOp::new(f))
  }

  /// Alias of [`concat_map_future`](ProducerLike::concat_map_future).
  #[inline]
  fn flat_map_future<F, Fut, B>(self, f: F) -> Lifted<Self, ConcatMapOp<F, FailFast, ViaFuture>>
  where
    F: FnMut(Self::Item) -> Fut + Send + 'static,
    Fut: Future<Output = Result<B, Self::Err>>,
    B: Send + 'static,
  {
    self.concat_map_future(f)
  }
}

impl<T: ObservableType> ProducerLike for T {}
