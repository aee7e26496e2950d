//! Observer trait and implementations
//!
//! The Observer is the consumer side of a stream: it receives values through
//! `next`, and exactly one terminal signal through `error` or `complete`.
//! `next` answers with an [`AckFuture`]; see [`crate::ack`] for the
//! backpressure rules a producer follows.

use crate::{
  ack::{Ack, AckFuture},
  rc::MutArc,
};

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
pub trait Observer<Item, Err>: Send + 'static {
  /// Receive the next value. The producer must not send another value until
  /// the returned ack resolved to [`Ack::Continue`].
  fn next(&mut self, value: Item) -> AckFuture;

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: Err);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Returns `true` if the observer will not accept more values.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (Box<dyn Observer>)
///
/// Standard Observer trait is not object-safe because `error` and `complete`
/// take `self` by value. DynObserver mirrors the interface but adapts it for
/// vtables.
pub trait DynObserver<Item, Err>: Send {
  fn box_next(&mut self, value: Item) -> AckFuture;
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) -> AckFuture { self.next(value) }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Type-erased observer.
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err>>;

impl<Item: 'static, Err: 'static> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) -> AckFuture { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

/// Helper trait to convert observers into [`BoxedObserver`].
pub trait IntoBoxedObserver<Item, Err> {
  fn into_boxed(self) -> BoxedObserver<Item, Err>;
}

impl<Item, Err, O> IntoBoxedObserver<Item, Err> for O
where
  O: Observer<Item, Err>,
{
  fn into_boxed(self) -> BoxedObserver<Item, Err> { Box::new(self) }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer from a `next` closure; errors and completion are ignored.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnMutObserver<F>
where
  F: FnMut(Item) + Send + 'static,
{
  #[inline]
  fn next(&mut self, v: Item) -> AckFuture {
    (self.0)(v);
    AckFuture::continue_now()
  }

  #[inline]
  fn error(self, _err: Err) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from three closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> ObserverAll<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<Item, Err, N, E, C> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item) + Send + 'static,
  E: FnOnce(Err) + Send + 'static,
  C: FnOnce() + Send + 'static,
{
  fn next(&mut self, value: Item) -> AckFuture {
    (self.next)(value);
    AckFuture::continue_now()
  }

  fn error(self, err: Err) { (self.error)(err) }

  fn complete(self) { (self.complete)() }

  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// SafeObserver - grammar guard
// ============================================================================

/// Guards the observer grammar at the public subscribe boundary.
///
/// Once the wrapped observer answered [`Ack::Stop`] it is dropped, and any
/// later signal is ignored. The terminal methods consume the guard, so a
/// second terminal signal cannot be expressed.
pub struct SafeObserver<O>(Option<O>);

impl<O> SafeObserver<O> {
  pub fn new(observer: O) -> Self { Self(Some(observer)) }
}

impl<O, Item, Err> Observer<Item, Err> for SafeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) -> AckFuture {
    let Some(inner) = self.0.as_mut() else {
      return AckFuture::stop_now();
    };
    let ack = inner.next(value);
    if ack.now() == Some(Ack::Stop) {
      self.0 = None;
    }
    ack
  }

  fn error(self, err: Err) { self.0.error(err) }

  fn complete(self) { self.0.complete() }

  fn is_closed(&self) -> bool { self.0.is_closed() }
}

// ============================================================================
// Observer implementations for Option and reference-counted Option wrappers
// ============================================================================

/// Option observer - None stops every value, Some delegates to inner
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) -> AckFuture {
    match self {
      Some(inner) => inner.next(value),
      None => AckFuture::stop_now(),
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Observer::is_closed) }
}

/// MutArc<Option<O>> - shared ownership observer
/// Uses take() for terminal operations to consume the inner observer
impl<O, Item, Err> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) -> AckFuture { self.rc_deref_mut().next(value) }

  fn error(self, err: Err) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.error(err);
    }
  }

  fn complete(self) {
    let inner = self.rc_deref_mut().take();
    if let Some(inner) = inner {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref_mut().is_none() }
}

// ============================================================================
// Tests
// ============================================================================
