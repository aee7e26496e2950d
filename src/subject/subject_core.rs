use futures::{future::join_all, FutureExt};

use super::{
  subject_subscription::SubjectSubscription,
  subscribers::{Slot, Subscribers},
  SubjectState,
};
use crate::{
  ack::{Ack, AckFuture},
  observable::{drive, CoreObservable, ObservableType},
  observer::{IntoBoxedObserver, Observer},
  rc::MutArc,
  subscriber::Subscriber,
  subscription::BooleanSubscription,
};

/// What a subject remembers for subscribers that join late.
///
/// Each multicast strategy is one implementation; the fan-out, the state
/// machine and the subscription handling are shared by all of them.
pub trait ReplayBuffer<Item>: Send + 'static {
  /// Remember a value pushed into the subject.
  fn record(&mut self, value: &Item);

  /// Values a subscriber joining in `state` receives before anything else.
  ///
  /// For a subject that does not forward live values, this is also what the
  /// subscribers present at completion receive.
  fn replay(&self, state: SubjectState) -> Vec<Item>;

  /// Whether pushed values are delivered to subscribers as they arrive.
  fn forwards_live(&self) -> bool { true }
}

pub(crate) struct SubjectInner<Item, Err, R> {
  subscribers: Subscribers<Item, Err>,
  state: SubjectState,
  error: Option<Err>,
  pub(crate) buffer: R,
}

/// A hot producer multicasting the values it receives as an observer.
///
/// `Subject` is a cheap handle: clones share the same subscribers and the
/// same state. The replay policy `R` decides what late subscribers see.
///
/// A value is delivered to a snapshot of the subscribers taken under the
/// lock, outside of it, so subscribing and unsubscribing from another thread
/// (or from inside a callback) never blocks on a delivery in progress. The
/// ack returned by `next` resolves once every subscriber acknowledged;
/// subscribers answering [`Ack::Stop`] are removed.
///
/// ```rust
/// use rxflow::prelude::*;
///
/// let ctx = TestScheduler::new().context();
/// let subject = PublishSubject::<i32, ()>::new();
/// let seen = MutArc::own(vec![]);
/// let c_seen = seen.clone();
/// subject
///   .clone()
///   .subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), &ctx);
///
/// let mut input = subject.clone();
/// let _ = input.next(1);
/// let _ = input.next(2);
/// assert_eq!(*seen.rc_deref_mut(), vec![1, 2]);
/// ```
pub struct Subject<Item, Err, R> {
  pub(crate) inner: MutArc<SubjectInner<Item, Err, R>>,
}

impl<Item, Err, R> Clone for Subject<Item, Err, R> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err, R> Subject<Item, Err, R> {
  pub(crate) fn with_buffer(buffer: R) -> Self {
    Self {
      inner: MutArc::own(SubjectInner {
        subscribers: Subscribers::default(),
        state: SubjectState::Active,
        error: None,
        buffer,
      }),
    }
  }

  pub fn state(&self) -> SubjectState { self.inner.rc_deref_mut().state }

  /// Number of subscribers currently registered.
  pub fn observer_count(&self) -> usize { self.inner.rc_deref_mut().subscribers.len() }

  pub(crate) fn detach(&self, id: usize) {
    let slot = self.inner.rc_deref_mut().subscribers.remove(id);
    if let Some(slot) = slot {
      slot.closed.close();
    }
  }
}

impl<Item, Err, R> Subject<Item, Err, R>
where
  Item: Send + 'static,
  Err: Send + 'static,
  R: Send + 'static,
{
  fn deliver(
    &self, id: usize, slot: &Slot<Item, Err>, value: Item,
    pending: &mut Vec<futures::future::BoxFuture<'static, ()>>,
  ) {
    match slot.next(value) {
      AckFuture::Now(Ack::Continue) => {}
      AckFuture::Now(Ack::Stop) => self.detach(id),
      AckFuture::Later(ack) => {
        let subject = self.clone();
        pending.push(
          async move {
            if ack.await == Ack::Stop {
              subject.detach(id);
            }
          }
          .boxed(),
        );
      }
    }
  }

  fn terminate(&self, state: SubjectState, err: Option<Err>)
  where
    Item: Clone,
    Err: Clone,
    R: ReplayBuffer<Item>,
  {
    let (slots, tail) = {
      let mut inner = self.inner.rc_deref_mut();
      if inner.state != SubjectState::Active {
        return;
      }
      inner.state = state;
      inner.error = err.clone();
      let tail = if inner.buffer.forwards_live() { vec![] } else { inner.buffer.replay(state) };
      tracing::debug!(?state, subscribers = inner.subscribers.len(), "subject terminated");
      (inner.subscribers.drain(), tail)
    };
    for slot in slots {
      slot.terminate(tail.clone(), err.clone());
    }
  }
}

impl<Item, Err, R> ObservableType for Subject<Item, Err, R>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, R> Observer<Item, Err> for Subject<Item, Err, R>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  R: ReplayBuffer<Item>,
{
  fn next(&mut self, value: Item) -> AckFuture {
    let slots = {
      let mut inner = self.inner.rc_deref_mut();
      if inner.state != SubjectState::Active {
        tracing::warn!(state = ?inner.state, "value sent to a terminated subject was dropped");
        return AckFuture::stop_now();
      }
      inner.buffer.record(&value);
      if !inner.buffer.forwards_live() {
        return AckFuture::continue_now();
      }
      inner.subscribers.snapshot()
    };

    let mut pending = Vec::new();
    let mut iter = slots.into_iter().peekable();
    while let Some((id, slot)) = iter.next() {
      if iter.peek().is_some() {
        self.deliver(id, &slot, value.clone(), &mut pending);
      } else {
        self.deliver(id, &slot, value, &mut pending);
        break;
      }
    }

    if pending.is_empty() {
      AckFuture::continue_now()
    } else {
      AckFuture::later(join_all(pending).map(|_| Ack::Continue))
    }
  }

  fn error(self, err: Err) { self.terminate(SubjectState::Erred, Some(err)) }

  fn complete(self) { self.terminate(SubjectState::Completed, None) }

  fn is_closed(&self) -> bool { self.state() != SubjectState::Active }
}

impl<Item, Err, R, O> CoreObservable<O> for Subject<Item, Err, R>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  R: ReplayBuffer<Item>,
  O: Observer<Item, Err>,
{
  type Unsub = SubjectSubscription<Item, Err, R>;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> SubjectSubscription<Item, Err, R> {
    let mut inner = self.inner.rc_deref_mut();
    let state = inner.state;
    let history = inner.buffer.replay(state);

    if state != SubjectState::Active {
      let err = inner.error.clone();
      drop(inner);
      tracing::trace!(replayed = history.len(), ?state, "late subscriber to a terminated subject");
      let cancel = BooleanSubscription::new();
      let events = history.into_iter().map(Ok).chain(err.map(Err));
      drive(events, subscriber, cancel.clone());
      return SubjectSubscription::detached(cancel);
    }

    if !history.is_empty() {
      tracing::trace!(replayed = history.len(), "replaying history to a late subscriber");
    }
    let (slot, replay) = Slot::new(subscriber.transform(IntoBoxedObserver::into_boxed), history);
    let closed = slot.closed.clone();
    let id = inner.subscribers.add(slot.clone());
    drop(inner);
    // Live values sent during the replay queue up behind the history.
    if let Some(observer) = replay {
      slot.connect(observer);
    }
    SubjectSubscription::new(self, id, closed)
  }
}
