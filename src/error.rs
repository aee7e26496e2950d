//! Error types produced by the composition layer itself.
//!
//! The layer never recovers from an error; it only forwards or aggregates
//! the errors of the producers it composes. Two errors originate here:
//!
//! - [`CompositeError`]: the aggregate emitted by the delay-errors path.
//! - [`BufferOverflowError`]: raised by
//!   [`OverflowStrategy::Fail`](crate::buffered::OverflowStrategy::Fail).
//!
//! [`RxError`] is a ready-made error type that can carry both, useful when a
//! stream has no domain error of its own.

/// Aggregate of one or more causes, each distinct, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} error(s) occurred", .errors.len())]
pub struct CompositeError<E> {
  errors: Vec<E>,
}

impl<E> CompositeError<E> {
  pub fn new() -> Self { Self { errors: Vec::new() } }

  /// The collected causes.
  #[inline]
  pub fn errors(&self) -> &[E] { &self.errors }

  #[inline]
  pub fn len(&self) -> usize { self.errors.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  pub fn into_errors(self) -> Vec<E> { self.errors }
}

impl<E: PartialEq> CompositeError<E> {
  /// Record `err` unless an equal cause is already present.
  ///
  /// Returns `true` if the cause was new.
  pub fn push_distinct(&mut self, err: E) -> bool {
    if self.errors.contains(&err) {
      false
    } else {
      self.errors.push(err);
      true
    }
  }
}

impl<E> Default for CompositeError<E> {
  fn default() -> Self { Self::new() }
}

impl<E: PartialEq> FromIterator<E> for CompositeError<E> {
  fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
    let mut composite = CompositeError::new();
    for err in iter {
      composite.push_distinct(err);
    }
    composite
  }
}

/// A buffer configured to fail on overflow received more than `capacity`
/// pending values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("buffer overflow: more than {capacity} pending values")]
pub struct BufferOverflowError {
  pub capacity: usize,
}

/// General purpose stream error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RxError {
  /// Error raised by a producer.
  #[error("source error: {0}")]
  Source(String),

  #[error(transparent)]
  Overflow(#[from] BufferOverflowError),

  #[error(transparent)]
  Composite(#[from] CompositeError<RxError>),
}

impl RxError {
  pub fn source_error(context: impl Into<String>) -> Self { RxError::Source(context.into()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxflow_macro::test]
  fn composite_keeps_first_occurrence_order() {
    let composite: CompositeError<&str> = ["e1", "e2", "e1", "e3", "e2"]
      .into_iter()
      .collect();
    assert_eq!(composite.errors(), &["e1", "e2", "e3"]);
    assert_eq!(composite.to_string(), "3 error(s) occurred");
  }

  #[rxflow_macro::test]
  fn overflow_converts_into_rx_error() {
    let err: RxError = BufferOverflowError { capacity: 2 }.into();
    assert_eq!(err.to_string(), "buffer overflow: more than 2 pending values");
  }
}
