use super::Subject;
use crate::subscription::{BooleanSubscription, Subscription};

/// Subscription handle of a subject subscriber.
///
/// Cancelling removes the observer from the subject. A subscriber that
/// joined after the subject terminated only holds the flag stopping its
/// replay.
pub struct SubjectSubscription<Item, Err, R> {
  subject: Option<(Subject<Item, Err, R>, usize)>,
  closed: BooleanSubscription,
}

impl<Item, Err, R> SubjectSubscription<Item, Err, R> {
  pub(crate) fn new(subject: Subject<Item, Err, R>, id: usize, closed: BooleanSubscription) -> Self {
    Self { subject: Some((subject, id)), closed }
  }

  pub(crate) fn detached(closed: BooleanSubscription) -> Self { Self { subject: None, closed } }
}

impl<Item, Err, R> Subscription for SubjectSubscription<Item, Err, R> {
  fn unsubscribe(self) {
    if self.closed.close() {
      if let Some((subject, id)) = self.subject {
        subject.detach(id);
      }
    }
  }

  fn is_closed(&self) -> bool { self.closed.is_closed() }
}
