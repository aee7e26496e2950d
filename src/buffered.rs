//! Buffered subscriber: serializes concurrent writers onto one consumer.
//!
//! Writers push values into a queue guarded by a mutex and get a synchronous
//! ack back; a single drain task on the execution context feeds the queue to
//! the wrapped subscriber, waiting for every ack. When the consumer cannot
//! keep pace and the queue reaches its capacity, the [`OverflowStrategy`]
//! decides what happens to the incoming value.

use std::collections::VecDeque;

use crate::{
  ack::{Ack, AckFuture},
  error::BufferOverflowError,
  observer::Observer,
  rc::MutArc,
  scheduler::ExecutionContext,
  subscriber::Subscriber,
  subscription::{BooleanSubscription, Subscription},
};

/// Policy applied when a bounded buffer is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowStrategy {
  /// Never drop anything; the queue grows without bound.
  #[default]
  Unbounded,
  /// Drop the incoming value.
  DropNew(usize),
  /// Drop the oldest queued value to make room.
  DropOld(usize),
  /// Drop everything queued, then queue the incoming value.
  ClearBuffer(usize),
  /// Terminate the stream with [`BufferOverflowError`] once the
  /// already queued values are delivered.
  Fail(usize),
}

impl OverflowStrategy {
  /// The queue capacity, `None` for [`OverflowStrategy::Unbounded`].
  ///
  /// Capacities below 1 are treated as 1.
  pub fn capacity(&self) -> Option<usize> {
    match *self {
      OverflowStrategy::Unbounded => None,
      OverflowStrategy::DropNew(n)
      | OverflowStrategy::DropOld(n)
      | OverflowStrategy::ClearBuffer(n)
      | OverflowStrategy::Fail(n) => Some(n.max(1)),
    }
  }
}

enum Terminal<Err> {
  Complete,
  Error(Err),
}

struct BufferState<Item, Err> {
  queue: VecDeque<Item>,
  terminal: Option<Terminal<Err>>,
  draining: bool,
  // The terminal signal was delivered or the consumer stopped.
  done: bool,
}

/// An observer safe for unsynchronized writes from several producers.
///
/// Every clone feeds the same queue and the same downstream subscriber.
/// Writes are serialized by the queue lock; the drain runs on the
/// subscriber's execution context and honours the downstream acks.
pub struct BufferedSubscriber<O, Item, Err> {
  state: MutArc<BufferState<Item, Err>>,
  observer: MutArc<Option<O>>,
  strategy: OverflowStrategy,
  on_overflow: Option<fn(BufferOverflowError) -> Err>,
  ctx: ExecutionContext,
  cancel: BooleanSubscription,
}

impl<O, Item, Err> Clone for BufferedSubscriber<O, Item, Err> {
  fn clone(&self) -> Self {
    Self {
      state: self.state.clone(),
      observer: self.observer.clone(),
      strategy: self.strategy,
      on_overflow: self.on_overflow,
      ctx: self.ctx.clone(),
      cancel: self.cancel.clone(),
    }
  }
}

impl<O, Item, Err> BufferedSubscriber<O, Item, Err> {
  pub fn new(subscriber: Subscriber<O>, strategy: OverflowStrategy) -> Self
  where
    Err: From<BufferOverflowError>,
  {
    let on_overflow: fn(BufferOverflowError) -> Err = Err::from;
    Self::build(subscriber, strategy, Some(on_overflow))
  }

  /// A buffer that never overflows, for error types unrelated to
  /// [`BufferOverflowError`].
  pub fn unbounded(subscriber: Subscriber<O>) -> Self {
    Self::build(subscriber, OverflowStrategy::Unbounded, None)
  }

  fn build(
    subscriber: Subscriber<O>, strategy: OverflowStrategy,
    on_overflow: Option<fn(BufferOverflowError) -> Err>,
  ) -> Self {
    let (observer, ctx) = subscriber.into_parts();
    Self {
      state: MutArc::own(BufferState {
        queue: VecDeque::new(),
        terminal: None,
        draining: false,
        done: false,
      }),
      observer: MutArc::own(Some(observer)),
      strategy,
      on_overflow,
      ctx,
      cancel: BooleanSubscription::new(),
    }
  }

  pub fn strategy(&self) -> OverflowStrategy { self.strategy }

  /// Number of values waiting for the consumer.
  pub fn pending(&self) -> usize { self.state.rc_deref_mut().queue.len() }

  /// Flag that stops the drain and rejects further values once closed.
  pub fn cancel_handle(&self) -> BooleanSubscription { self.cancel.clone() }
}

impl<O, Item, Err> BufferedSubscriber<O, Item, Err>
where
  O: Observer<Item, Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  /// Queue `value` applying the overflow policy. Returns `true` if a drain
  /// has to be started.
  fn enqueue(&self, value: Item) -> Result<bool, ()> {
    let mut state = self.state.rc_deref_mut();
    if state.done || state.terminal.is_some() {
      return Err(());
    }
    match self.strategy.capacity() {
      Some(capacity) if state.queue.len() >= capacity => match self.strategy {
        OverflowStrategy::DropNew(_) => {
          tracing::debug!(capacity, "buffer full, dropping the incoming value");
        }
        OverflowStrategy::DropOld(_) => {
          tracing::debug!(capacity, "buffer full, dropping the oldest value");
          state.queue.pop_front();
          state.queue.push_back(value);
        }
        OverflowStrategy::ClearBuffer(_) => {
          tracing::debug!(dropped = state.queue.len(), "buffer full, clearing it");
          state.queue.clear();
          state.queue.push_back(value);
        }
        OverflowStrategy::Fail(_) | OverflowStrategy::Unbounded => {
          tracing::warn!(capacity, "buffer overflow, failing the stream");
          let err = BufferOverflowError { capacity };
          state.terminal = self.on_overflow.map(|convert| Terminal::Error(convert(err)));
          return Err(());
        }
      },
      _ => state.queue.push_back(value),
    }
    Ok(!std::mem::replace(&mut state.draining, true))
  }

  fn terminate(&self, terminal: Terminal<Err>) {
    let start = {
      let mut state = self.state.rc_deref_mut();
      if state.done || state.terminal.is_some() {
        return;
      }
      state.terminal = Some(terminal);
      !std::mem::replace(&mut state.draining, true)
    };
    if start {
      self.spawn_drain();
    }
  }

  fn spawn_drain(&self) {
    let this = self.clone();
    self.ctx.spawn(async move { this.drain().await });
  }

  async fn drain(self) {
    loop {
      if self.cancel.is_closed() {
        let mut state = self.state.rc_deref_mut();
        state.queue.clear();
        state.done = true;
        state.draining = false;
        return;
      }

      let next = {
        let mut state = self.state.rc_deref_mut();
        match state.queue.pop_front() {
          Some(value) => Ok(value),
          None => match state.terminal.take() {
            Some(terminal) => {
              state.done = true;
              state.draining = false;
              Err(Some(terminal))
            }
            None => {
              state.draining = false;
              Err(None)
            }
          },
        }
      };

      match next {
        Ok(value) => {
          let ack = Observer::<Item, Err>::next(&mut *self.observer.rc_deref_mut(), value);
          if ack.await == Ack::Stop {
            let mut state = self.state.rc_deref_mut();
            state.done = true;
            state.draining = false;
            state.queue.clear();
            return;
          }
        }
        Err(Some(Terminal::Complete)) => {
          return Observer::<Item, Err>::complete(self.observer.clone());
        }
        Err(Some(Terminal::Error(err))) => {
          return Observer::<Item, Err>::error(self.observer.clone(), err);
        }
        Err(None) => return,
      }
    }
  }
}

impl<O, Item, Err> Observer<Item, Err> for BufferedSubscriber<O, Item, Err>
where
  O: Observer<Item, Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) -> AckFuture {
    if self.cancel.is_closed() {
      return AckFuture::stop_now();
    }
    match self.enqueue(value) {
      Ok(start) => {
        if start {
          self.spawn_drain();
        }
        AckFuture::continue_now()
      }
      Err(()) => {
        // A tripped Fail policy still has to flush the queue and the error.
        let start = {
          let mut state = self.state.rc_deref_mut();
          state.terminal.is_some() && !std::mem::replace(&mut state.draining, true)
        };
        if start {
          self.spawn_drain();
        }
        AckFuture::stop_now()
      }
    }
  }

  fn error(self, err: Err) { self.terminate(Terminal::Error(err)) }

  fn complete(self) { self.terminate(Terminal::Complete) }

  fn is_closed(&self) -> bool { self.cancel.is_closed() || self.state.rc_deref_mut().done }
}

impl<O, Item, Err> Subscription for BufferedSubscriber<O, Item, Err> {
  fn unsubscribe(self) { self.cancel.close(); }

  fn is_closed(&self) -> bool { self.cancel.is_closed() }
}
