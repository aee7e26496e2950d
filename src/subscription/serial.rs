use super::{BoxedSubscription, Subscription};
use crate::rc::MutArc;

#[derive(Default)]
struct SerialState {
  closed: bool,
  current: Option<BoxedSubscription>,
}

/// Holds at most one inner subscription at a time.
///
/// Setting a new inner cancels the previous one. Once the serial
/// subscription is cancelled, every inner set afterwards is cancelled on
/// arrival, which covers an inner subscribe racing with cancellation.
#[derive(Clone, Default)]
pub struct SerialSubscription(MutArc<SerialState>);

impl SerialSubscription {
  pub fn new() -> Self { Self::default() }

  /// Replace the current inner subscription.
  pub fn set(&self, subscription: BoxedSubscription) {
    let previous = {
      let mut state = self.0.rc_deref_mut();
      if state.closed {
        Some(subscription)
      } else {
        state.current.replace(subscription)
      }
    };
    if let Some(previous) = previous {
      previous.unsubscribe();
    }
  }

  /// Drop the current inner without cancelling it, e.g. once it finished.
  pub fn clear(&self) { self.0.rc_deref_mut().current = None; }
}

impl Subscription for SerialSubscription {
  fn unsubscribe(self) {
    let current = {
      let mut state = self.0.rc_deref_mut();
      state.closed = true;
      state.current.take()
    };
    if let Some(current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.rc_deref_mut().closed }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::BooleanSubscription;

  #[rxflow_macro::test]
  fn set_cancels_previous() {
    let serial = SerialSubscription::new();
    let first = BooleanSubscription::new();
    let second = BooleanSubscription::new();

    serial.set(BoxedSubscription::new(first.clone()));
    serial.set(BoxedSubscription::new(second.clone()));
    assert!(first.is_closed());
    assert!(!second.is_closed());

    serial.clone().unsubscribe();
    assert!(second.is_closed());
    assert!(serial.is_closed());
  }

  #[rxflow_macro::test]
  fn set_after_cancel_cancels_immediately() {
    let serial = SerialSubscription::new();
    serial.clone().unsubscribe();
    serial.clone().unsubscribe();

    let late = BooleanSubscription::new();
    serial.set(BoxedSubscription::new(late.clone()));
    assert!(late.is_closed());
  }
}
