use std::collections::VecDeque;

use futures::channel::oneshot;
use smallvec::SmallVec;

use crate::{
  ack::{Ack, AckFuture},
  observable::drive,
  observer::{BoxedObserver, Observer},
  rc::MutArc,
  scheduler::ExecutionContext,
  subscriber::Subscriber,
  subscription::{BooleanSubscription, DynamicSubscriptions, Subscription},
};

struct SlotState<Item, Err> {
  // `None` while a delivery or a replay holds the observer.
  observer: Option<BoxedObserver<Item, Err>>,
  // Values waiting for the observer, history first. Live values carry the
  // sender of the ack handed to the subject.
  queued: VecDeque<(Item, Option<oneshot::Sender<Ack>>)>,
  // A terminal signal that arrived while the observer was held.
  terminal: Option<(Vec<Item>, Option<Err>)>,
  done: bool,
}

/// One registered observer.
///
/// The subject delivers to a snapshot of slots outside its own lock, so a
/// slot carries its own cancellation flag: a subscription cancelled while a
/// value is in flight stops receiving at the next delivery.
///
/// The observer is taken out of the slot while it runs. Whatever reaches the
/// slot meanwhile (a value sent from inside the callback, live values during
/// a history replay, a terminal signal) is queued and delivered in order once
/// the observer is handed back; queued values answer with a deferred ack
/// resolved by the observer's own ack.
pub(crate) struct Slot<Item, Err> {
  pub(crate) closed: BooleanSubscription,
  state: MutArc<SlotState<Item, Err>>,
  ctx: ExecutionContext,
}

impl<Item, Err> Clone for Slot<Item, Err> {
  fn clone(&self) -> Self {
    Self { closed: self.closed.clone(), state: self.state.clone(), ctx: self.ctx.clone() }
  }
}

impl<Item, Err> Slot<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// A slot whose observer first receives `history`. When there is history,
  /// the observer is returned and must be handed to [`Slot::connect`] once
  /// the slot is registered.
  pub(crate) fn new(
    subscriber: Subscriber<BoxedObserver<Item, Err>>, history: Vec<Item>,
  ) -> (Self, Option<BoxedObserver<Item, Err>>) {
    let (observer, ctx) = subscriber.into_parts();
    let connected = history.is_empty();
    let (held, pending) = if connected { (Some(observer), None) } else { (None, Some(observer)) };
    let state = SlotState {
      observer: held,
      queued: history.into_iter().map(|value| (value, None)).collect(),
      terminal: None,
      done: false,
    };
    let slot = Self { closed: BooleanSubscription::new(), state: MutArc::own(state), ctx };
    (slot, pending)
  }

  pub(crate) fn next(&self, value: Item) -> AckFuture {
    if self.closed.is_closed() {
      return AckFuture::stop_now();
    }
    let mut state = self.state.rc_deref_mut();
    if state.done {
      return AckFuture::stop_now();
    }
    match state.observer.take() {
      Some(mut observer) => {
        drop(state);
        let ack = observer.next(value);
        self.connect(observer);
        ack
      }
      None => {
        let (tx, rx) = oneshot::channel();
        state.queued.push_back((value, Some(tx)));
        AckFuture::from_receiver(rx)
      }
    }
  }

  /// Emit `tail` then the terminal signal (`None` completes), after anything
  /// still queued.
  pub(crate) fn terminate(&self, tail: Vec<Item>, err: Option<Err>) {
    if self.closed.is_closed() {
      return;
    }
    let mut state = self.state.rc_deref_mut();
    if state.done {
      return;
    }
    match state.observer.take() {
      Some(observer) => {
        state.done = true;
        drop(state);
        self.emit_terminal(observer, tail, err);
      }
      None => state.terminal = Some((tail, err)),
    }
  }

  /// Deliver what queued up while the observer was held, then hand the
  /// observer back to the slot.
  pub(crate) fn connect(&self, mut observer: BoxedObserver<Item, Err>) {
    loop {
      if self.closed.is_closed() {
        return self.refuse(None);
      }
      let mut state = self.state.rc_deref_mut();
      let Some((value, tx)) = state.queued.pop_front() else {
        match state.terminal.take() {
          Some((tail, err)) => {
            state.done = true;
            drop(state);
            self.emit_terminal(observer, tail, err);
          }
          None => state.observer = Some(observer),
        }
        return;
      };
      drop(state);

      match observer.next(value) {
        AckFuture::Now(Ack::Continue) => ack_queued(tx, Ack::Continue),
        AckFuture::Now(Ack::Stop) => return self.refuse(tx),
        AckFuture::Later(ack) => {
          let slot = self.clone();
          self.ctx.spawn(async move {
            match ack.await {
              Ack::Continue => {
                ack_queued(tx, Ack::Continue);
                slot.connect(observer);
              }
              Ack::Stop => slot.refuse(tx),
            }
          });
          return;
        }
      }
    }
  }

  // The observer answered `Stop`: it receives nothing more, and every
  // queued value resolves to `Stop`.
  fn refuse(&self, tx: Option<oneshot::Sender<Ack>>) {
    ack_queued(tx, Ack::Stop);
    self.closed.close();
    let mut state = self.state.rc_deref_mut();
    state.done = true;
    state.queued.clear();
    state.terminal = None;
  }

  fn emit_terminal(&self, observer: BoxedObserver<Item, Err>, tail: Vec<Item>, err: Option<Err>) {
    let events = tail.into_iter().map(Ok).chain(err.map(Err));
    drive(events, Subscriber::new(observer, self.ctx.clone()), self.closed.clone());
  }
}

fn ack_queued(tx: Option<oneshot::Sender<Ack>>, ack: Ack) {
  if let Some(tx) = tx {
    let _ = tx.send(ack);
  }
}

pub(crate) type Snapshot<Item, Err> = SmallVec<[(usize, Slot<Item, Err>); 2]>;

/// Registry of the observers subscribed to a subject.
pub(crate) struct Subscribers<Item, Err> {
  inner: DynamicSubscriptions<Slot<Item, Err>>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { inner: DynamicSubscriptions::default() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  #[inline]
  pub(crate) fn add(&mut self, slot: Slot<Item, Err>) -> usize { self.inner.add(slot) }

  #[inline]
  pub(crate) fn remove(&mut self, id: usize) -> Option<Slot<Item, Err>> { self.inner.remove(id) }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.inner.len() }

  /// The current observers, to deliver to once the lock is released.
  pub(crate) fn snapshot(&self) -> Snapshot<Item, Err> {
    self
      .inner
      .entries()
      .map(|(id, slot)| (id, slot.clone()))
      .collect()
  }

  /// Remove every observer, e.g. on a terminal signal.
  pub(crate) fn drain(&mut self) -> Vec<Slot<Item, Err>> { self.inner.drain().collect() }
}
