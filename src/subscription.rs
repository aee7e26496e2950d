//! Cancellation handles.
//!
//! Every subscribe call returns a [`Subscription`]. Cancelling it must stop
//! the whole chain it was built from: each lifted operator pairs the
//! upstream handle with its own teardown, so `unsubscribe` reaches the source
//! and every inner subscription an operator started.
//!
//! All handles here are idempotent: cancelling twice is the same as
//! cancelling once.

mod boolean;
mod boxed;
mod dynamic;
mod serial;
mod tuple;

pub use boolean::BooleanSubscription;
pub use boxed::BoxedSubscription;
pub use dynamic::DynamicSubscriptions;
pub use serial::SerialSubscription;
pub use tuple::TupleSubscription;

/// Handle to cancel an active subscription.
pub trait Subscription {
  /// Stop the delivery of events and release resources held upstream.
  fn unsubscribe(self);

  /// Whether the subscription is already cancelled or finished.
  fn is_closed(&self) -> bool;
}

/// A subscription holding nothing, e.g. for sources that finished
/// synchronously.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, |s| s.is_closed()) }
}
