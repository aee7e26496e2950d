//! `concat_map` and its delay-errors variant.
//!
//! For every upstream value the mapping function produces an inner producer.
//! The inner producer is subscribed immediately and its whole output is
//! forwarded before the next upstream value is admitted: the upstream `next`
//! answers with a deferred ack that only resolves once the inner producer
//! terminated. Outputs of two inner producers therefore never interleave.
//!
//! Errors follow an [`ErrorMode`]:
//!
//! - [`FailFast`]: the first error, upstream or inner, cancels the active
//!   inner subscription, stops the upstream and is forwarded as is.
//! - [`DelayErrors`]: errors are collected and the stream keeps going. Once
//!   the upstream terminated and the active inner finished, a single
//!   [`CompositeError`] holding every distinct cause in encounter order is
//!   emitted, or the stream completes if nothing failed.

use std::{future::Future, marker::PhantomData, sync::Arc};

use futures::channel::oneshot;

use crate::{
  ack::{Ack, AckFuture},
  error::CompositeError,
  observable::{from_future, CoreObservable, FromFuture, ObservableType},
  observer::Observer,
  ops::{ApplyOperator, Operator},
  rc::MutArc,
  scheduler::ExecutionContext,
  subscriber::Subscriber,
  subscription::{BooleanSubscription, BoxedSubscription, SerialSubscription, Subscription},
};

// ============================================================================
// Error modes
// ============================================================================

/// How `concat_map` treats the errors of its upstream and inner producers.
pub trait ErrorMode<E>: Send + Sync + 'static {
  /// Error type seen downstream.
  type OutErr: Send + 'static;
  /// Errors held back until the stream quiesces.
  type Errors: Default + Send + 'static;

  /// Either the error to emit right away, or `None` after recording it.
  fn on_error(errors: &mut Self::Errors, err: E) -> Option<Self::OutErr>;

  /// The error to emit once all work finished, if any.
  fn finish(errors: Self::Errors) -> Option<Self::OutErr>;
}

/// Forward the first error immediately.
pub struct FailFast;

/// Aggregate every error and emit it after all work finished.
pub struct DelayErrors;

impl<E: Send + 'static> ErrorMode<E> for FailFast {
  type OutErr = E;
  type Errors = ();

  #[inline]
  fn on_error(_: &mut (), err: E) -> Option<E> { Some(err) }

  #[inline]
  fn finish(_: ()) -> Option<E> { None }
}

impl<E: PartialEq + Send + 'static> ErrorMode<E> for DelayErrors {
  type OutErr = CompositeError<E>;
  type Errors = CompositeError<E>;

  fn on_error(errors: &mut CompositeError<E>, err: E) -> Option<CompositeError<E>> {
    errors.push_distinct(err);
    None
  }

  fn finish(errors: CompositeError<E>) -> Option<CompositeError<E>> {
    if errors.is_empty() { None } else { Some(errors) }
  }
}

// ============================================================================
// Inner producer factories
// ============================================================================

/// How the mapping function's result becomes an inner producer.
pub trait InnerKind<F, In>: Send + Sync + 'static {
  type Inner;

  fn make(func: &mut F, value: In) -> Self::Inner;
}

/// The mapping function returns a producer.
pub struct Direct;

/// The mapping function returns a future of a `Result`, run as a
/// single-value producer.
pub struct ViaFuture;

impl<F, In, R> InnerKind<F, In> for Direct
where
  F: FnMut(In) -> R,
{
  type Inner = R;

  #[inline]
  fn make(func: &mut F, value: In) -> R { func(value) }
}

impl<F, In, Fut, B, E> InnerKind<F, In> for ViaFuture
where
  F: FnMut(In) -> Fut,
  Fut: Future<Output = Result<B, E>>,
{
  type Inner = FromFuture<Fut>;

  #[inline]
  fn make(func: &mut F, value: In) -> FromFuture<Fut> { from_future(func(value)) }
}

// ============================================================================
// Operator
// ============================================================================

pub struct ConcatMapOp<F, M, K = Direct> {
  func: F,
  _marker: PhantomData<fn() -> (M, K)>,
}

impl<F, M, K> ConcatMapOp<F, M, K> {
  pub fn new(func: F) -> Self { Self { func, _marker: PhantomData } }
}

impl<F: Clone, M, K> Clone for ConcatMapOp<F, M, K> {
  fn clone(&self) -> Self { Self::new(self.func.clone()) }
}

// Inner producer and the item it emits.
type Inner<K, F, In> = <K as InnerKind<F, In>>::Inner;
type InnerItem<K, F, In> = <Inner<K, F, In> as ObservableType>::Item;

impl<In, InErr, F, M, K> Operator<In, InErr> for ConcatMapOp<F, M, K>
where
  F: Send + 'static,
  K: InnerKind<F, In>,
  Inner<K, F, In>: ObservableType<Err = InErr>,
  M: ErrorMode<InErr>,
{
  type Out = InnerItem<K, F, In>;
  type OutErr = <M as ErrorMode<InErr>>::OutErr;
}

impl<In, InErr, F, M, K, O> ApplyOperator<In, InErr, O> for ConcatMapOp<F, M, K>
where
  F: Send + 'static,
  K: InnerKind<F, In>,
  Inner<K, F, In>: ObservableType<Err = InErr> + CoreObservable<InnerObserver<O, M, InErr>>,
  M: ErrorMode<InErr>,
  O: Observer<InnerItem<K, F, In>, <M as ErrorMode<InErr>>::OutErr>,
  InErr: Send + 'static,
{
  type Upstream = ConcatMapObserver<O, F, M, K, InErr>;
  type Teardown = ConcatMapTeardown<O, M, InErr>;

  fn apply(
    self, downstream: Subscriber<O>,
  ) -> (Subscriber<Self::Upstream>, ConcatMapTeardown<O, M, InErr>) {
    let (observer, ctx) = downstream.into_parts();
    let shared = Arc::new(ConcatShared::new(observer));
    let teardown = ConcatMapTeardown { shared: shared.clone() };
    let upstream =
      ConcatMapObserver { func: self.func, shared, ctx: ctx.clone(), _kind: PhantomData };
    (Subscriber::new(upstream, ctx), teardown)
  }
}

// ============================================================================
// Shared state
// ============================================================================

struct ConcatState<Errs> {
  errors: Errs,
  upstream_done: bool,
  inner_active: bool,
  // The upstream `next` is still subscribing the inner producer.
  in_outer_next: bool,
  sync_ack: Option<Ack>,
  ack_tx: Option<oneshot::Sender<Ack>>,
  terminated: bool,
}

impl<Errs> ConcatState<Errs> {
  /// Resolve the ack of the pending upstream value.
  fn resolve(&mut self, ack: Ack) -> Option<oneshot::Sender<Ack>> {
    if self.in_outer_next {
      self.sync_ack = Some(ack);
      None
    } else {
      self.ack_tx.take()
    }
  }
}

fn send(tx: Option<oneshot::Sender<Ack>>, ack: Ack) {
  if let Some(tx) = tx {
    let _ = tx.send(ack);
  }
}

struct Downstream<O, Err> {
  // `None` while an inner value is being delivered.
  observer: Option<O>,
  // A terminal signal (`None` completes) sent during that delivery.
  terminal: Option<Option<Err>>,
}

struct ConcatShared<O, M: ErrorMode<E>, E> {
  state: MutArc<ConcatState<M::Errors>>,
  downstream: MutArc<Downstream<O, M::OutErr>>,
  inner: SerialSubscription,
  cancel: BooleanSubscription,
  _marker: PhantomData<fn() -> E>,
}

impl<O, M: ErrorMode<E>, E> ConcatShared<O, M, E> {
  fn new(downstream: O) -> Self {
    Self {
      state: MutArc::own(ConcatState {
        errors: M::Errors::default(),
        upstream_done: false,
        inner_active: false,
        in_outer_next: false,
        sync_ack: None,
        ack_tx: None,
        terminated: false,
      }),
      downstream: MutArc::own(Downstream { observer: Some(downstream), terminal: None }),
      inner: SerialSubscription::new(),
      cancel: BooleanSubscription::new(),
      _marker: PhantomData,
    }
  }

  /// The downstream refused further values, or the subscription was
  /// cancelled: stop the upstream and drop the inner producer.
  fn stop(&self) {
    let tx = {
      let mut state = self.state.rc_deref_mut();
      state.terminated = true;
      state.resolve(Ack::Stop)
    };
    self.cancel.close();
    self.inner.clone().unsubscribe();
    send(tx, Ack::Stop);
  }

  fn on_inner_next<B>(self: &Arc<Self>, value: B) -> AckFuture
  where
    O: Observer<B, M::OutErr>,
    E: Send + 'static,
  {
    if self.cancel.is_closed() {
      return AckFuture::stop_now();
    }
    let Some(mut observer) = self.downstream.rc_deref_mut().observer.take() else {
      return AckFuture::stop_now();
    };
    let ack = Observer::<B, M::OutErr>::next(&mut observer, value);
    self.restore::<B>(observer);
    match ack {
      AckFuture::Now(Ack::Stop) => {
        self.stop();
        AckFuture::stop_now()
      }
      AckFuture::Now(Ack::Continue) => ack,
      AckFuture::Later(ack) => {
        let shared = self.clone();
        AckFuture::later(async move {
          let ack = ack.await;
          if ack == Ack::Stop {
            shared.stop();
          }
          ack
        })
      }
    }
  }

  /// Hand the observer back after a delivery, or give it the terminal
  /// signal that arrived meanwhile.
  fn restore<B>(&self, observer: O)
  where
    O: Observer<B, M::OutErr>,
  {
    let mut downstream = self.downstream.rc_deref_mut();
    match downstream.terminal.take() {
      Some(terminal) => {
        drop(downstream);
        emit::<B, _, _>(observer, terminal);
      }
      None => downstream.observer = Some(observer),
    }
  }

  fn signal<B>(&self, terminal: Option<M::OutErr>)
  where
    O: Observer<B, M::OutErr>,
  {
    let mut downstream = self.downstream.rc_deref_mut();
    match downstream.observer.take() {
      Some(observer) => {
        drop(downstream);
        emit::<B, _, _>(observer, terminal);
      }
      None => downstream.terminal = Some(terminal),
    }
  }

  fn on_inner_complete<B>(&self)
  where
    O: Observer<B, M::OutErr>,
  {
    let (tx, finish) = {
      let mut state = self.state.rc_deref_mut();
      state.inner_active = false;
      if state.terminated {
        return;
      }
      (state.resolve(Ack::Continue), state.upstream_done)
    };
    self.inner.clear();
    send(tx, Ack::Continue);
    if finish {
      self.finish::<B>();
    }
  }

  fn on_upstream_complete<B>(&self)
  where
    O: Observer<B, M::OutErr>,
  {
    let finish = {
      let mut state = self.state.rc_deref_mut();
      state.upstream_done = true;
      !state.inner_active && !state.terminated
    };
    if finish {
      self.finish::<B>();
    }
  }

  fn on_error<B>(&self, err: E, from_upstream: bool)
  where
    O: Observer<B, M::OutErr>,
  {
    let mut state = self.state.rc_deref_mut();
    if state.terminated {
      return;
    }
    match M::on_error(&mut state.errors, err) {
      Some(err) => {
        state.terminated = true;
        let tx = state.resolve(Ack::Stop);
        drop(state);
        self.cancel.close();
        self.inner.clone().unsubscribe();
        send(tx, Ack::Stop);
        self.signal::<B>(Some(err));
      }
      None => {
        let tx = if from_upstream {
          state.upstream_done = true;
          None
        } else {
          state.inner_active = false;
          state.resolve(Ack::Continue)
        };
        let finish = state.upstream_done && !state.inner_active;
        drop(state);
        send(tx, Ack::Continue);
        if finish {
          self.finish::<B>();
        }
      }
    }
  }

  fn finish<B>(&self)
  where
    O: Observer<B, M::OutErr>,
  {
    let errors = {
      let mut state = self.state.rc_deref_mut();
      if state.terminated {
        return;
      }
      state.terminated = true;
      std::mem::take(&mut state.errors)
    };
    let err = M::finish(errors);
    if err.is_some() {
      tracing::debug!("concat_map: emitting held back errors after all inner producers finished");
    }
    self.signal::<B>(err);
  }
}

fn emit<B, Err, O: Observer<B, Err>>(observer: O, terminal: Option<Err>) {
  match terminal {
    Some(err) => observer.error(err),
    None => observer.complete(),
  }
}

// ============================================================================
// Observers
// ============================================================================

/// Upstream observer of `concat_map`.
pub struct ConcatMapObserver<O, F, M: ErrorMode<E>, K, E> {
  func: F,
  shared: Arc<ConcatShared<O, M, E>>,
  ctx: ExecutionContext,
  _kind: PhantomData<fn() -> K>,
}

impl<In, E, O, F, M, K> Observer<In, E> for ConcatMapObserver<O, F, M, K, E>
where
  F: Send + 'static,
  K: InnerKind<F, In>,
  Inner<K, F, In>: ObservableType<Err = E> + CoreObservable<InnerObserver<O, M, E>>,
  M: ErrorMode<E>,
  O: Observer<InnerItem<K, F, In>, <M as ErrorMode<E>>::OutErr>,
  E: Send + 'static,
{
  fn next(&mut self, value: In) -> AckFuture {
    if self.shared.cancel.is_closed() || self.shared.state.rc_deref_mut().terminated {
      return AckFuture::stop_now();
    }
    let inner = K::make(&mut self.func, value);
    let (tx, rx) = oneshot::channel();
    {
      let mut state = self.shared.state.rc_deref_mut();
      if state.terminated {
        return AckFuture::stop_now();
      }
      state.inner_active = true;
      state.in_outer_next = true;
      state.sync_ack = None;
      state.ack_tx = Some(tx);
    }

    let observer = InnerObserver { shared: self.shared.clone() };
    let unsub = inner.actual_subscribe(Subscriber::new(observer, self.ctx.clone()));
    self.shared.inner.set(BoxedSubscription::new(unsub));

    let mut state = self.shared.state.rc_deref_mut();
    state.in_outer_next = false;
    match state.sync_ack.take() {
      Some(ack) => {
        state.ack_tx = None;
        AckFuture::Now(ack)
      }
      None => AckFuture::from_receiver(rx),
    }
  }

  fn error(self, err: E) { self.shared.on_error::<InnerItem<K, F, In>>(err, true) }

  fn complete(self) { self.shared.on_upstream_complete::<InnerItem<K, F, In>>() }

  fn is_closed(&self) -> bool { self.shared.cancel.is_closed() }
}

/// Observer of the active inner producer.
pub struct InnerObserver<O, M: ErrorMode<E>, E> {
  shared: Arc<ConcatShared<O, M, E>>,
}

impl<B, E, O, M> Observer<B, E> for InnerObserver<O, M, E>
where
  M: ErrorMode<E>,
  O: Observer<B, M::OutErr>,
  E: Send + 'static,
{
  fn next(&mut self, value: B) -> AckFuture { self.shared.on_inner_next(value) }

  fn error(self, err: E) { self.shared.on_error::<B>(err, false) }

  fn complete(self) { self.shared.on_inner_complete::<B>() }

  fn is_closed(&self) -> bool { self.shared.cancel.is_closed() }
}

/// Cancels the upstream's pending ack and the active inner subscription.
pub struct ConcatMapTeardown<O, M: ErrorMode<E>, E> {
  shared: Arc<ConcatShared<O, M, E>>,
}

impl<O, M, E> Subscription for ConcatMapTeardown<O, M, E>
where
  O: Send + 'static,
  M: ErrorMode<E>,
  E: 'static,
{
  fn unsubscribe(self) {
    if !self.shared.cancel.is_closed() {
      tracing::trace!("concat_map: cancelled");
      self.shared.stop();
    }
  }

  fn is_closed(&self) -> bool { self.shared.cancel.is_closed() }
}
