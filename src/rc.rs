use std::sync::{Arc, Mutex, MutexGuard};

/// Shared mutable cell used for per-subscription state.
///
/// A poisoned lock only means a callback panicked on another thread while
/// holding the guard. The guard is recovered instead of propagating the
/// panic.
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> {
    self
      .0
      .lock()
      .unwrap_or_else(|poisoned| {
        tracing::warn!("mutex poisoned, recovering data");
        poisoned.into_inner()
      })
  }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: Default> Default for MutArc<T> {
  fn default() -> Self { Self::own(T::default()) }
}
