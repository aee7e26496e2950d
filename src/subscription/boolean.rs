use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use super::Subscription;

/// A shared cancellation flag.
///
/// Sources hand one clone to the caller and poll the other before every
/// emission.
#[derive(Clone, Debug, Default)]
pub struct BooleanSubscription(Arc<AtomicBool>);

impl BooleanSubscription {
  pub fn new() -> Self { Self::default() }

  /// Set the flag. Returns `true` only for the call that actually closed it.
  #[inline]
  pub fn close(&self) -> bool { !self.0.swap(true, Ordering::AcqRel) }
}

impl Subscription for BooleanSubscription {
  #[inline]
  fn unsubscribe(self) { self.close(); }

  #[inline]
  fn is_closed(&self) -> bool { self.0.load(Ordering::Acquire) }
}
