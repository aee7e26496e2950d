//! An observer bound to the execution context it runs on.

use crate::{ack::AckFuture, observer::Observer, scheduler::ExecutionContext};

/// An [`Observer`] paired with the [`ExecutionContext`] of its subscription.
///
/// Operators wrap the observer with [`transform`](Subscriber::transform) and
/// keep the context, so every stage of a chain schedules its deferred work
/// on the context the caller supplied at subscribe time.
pub struct Subscriber<O> {
  observer: O,
  ctx: ExecutionContext,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O, ctx: ExecutionContext) -> Self { Self { observer, ctx } }

  #[inline]
  pub fn context(&self) -> &ExecutionContext { &self.ctx }

  /// Transform the observer, inheriting the context.
  pub fn transform<U, F>(self, f: F) -> Subscriber<U>
  where
    F: FnOnce(O) -> U,
  {
    Subscriber { observer: f(self.observer), ctx: self.ctx }
  }

  pub fn into_inner(self) -> O { self.observer }

  pub fn into_parts(self) -> (O, ExecutionContext) { (self.observer, self.ctx) }
}

impl<O, Item, Err> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) -> AckFuture { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
