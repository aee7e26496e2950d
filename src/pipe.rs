//! Pipes: recipes producing an input observer and an output observable.
//!
//! A pipe holds no state. Every materialization builds a fresh subject and
//! returns both of its ends:
//!
//! - [`Pipe::unicast`]: the raw pair. The output can be subscribed exactly
//!   once; it is consumed by `subscribe` and is not `Clone`.
//! - [`Pipe::multicast`]: an output safe for any number of subscribers. By
//!   default the unicast output is subscribed by a fresh
//!   [`PublishSubject`] on the given context, and that subject is handed
//!   out. Pipes whose subject already fans out safely return it directly;
//!   [`SubjectPipe`] makes that choice once, when it is built.
//! - [`Pipe::concurrent`]: like `multicast`, with the input wrapped in a
//!   [`BufferedSubscriber`] so several threads can push without external
//!   locking.
//!
//! [`Pipe::lift`] and [`Pipe::transform`] return new recipes; nothing is
//! materialized until one of the methods above is called.
//!
//! ```rust
//! use rxflow::prelude::*;
//!
//! let ctx = TestScheduler::new().context();
//! let pipe = SubjectPipe::<i32, ()>::publish().lift(MapOp::new(|v: i32| v * 10));
//!
//! let (mut input, output) = pipe.multicast(&ctx);
//! let seen = MutArc::own(vec![]);
//! let c_seen = seen.clone();
//! output.subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), &ctx);
//!
//! let _ = input.next(1);
//! assert_eq!(*seen.rc_deref_mut(), vec![10]);
//! ```

use crate::{
  buffered::{BufferedSubscriber, OverflowStrategy},
  error::BufferOverflowError,
  multicast_strategy::MulticastStrategy,
  observable::{
    BoxedObservable, CoreObservable, Observable, ObservableType, SharedObservable,
    UnicastObservable,
  },
  observer::BoxedObserver,
  ops::{ApplyOperator, Operator},
  producer::ProducerLike,
  scheduler::ExecutionContext,
  subject::{PublishSubject, StrategySubject},
  subscriber::Subscriber,
};

/// Input end of every pipe.
pub type PipeInput<In, InErr> = StrategySubject<In, InErr>;

/// Input end of a concurrent pipe.
pub type ConcurrentInput<In, InErr> = BufferedSubscriber<StrategySubject<In, InErr>, In, InErr>;

pub trait Pipe: Sized {
  type In: Clone + Send + 'static;
  type InErr: Clone + Send + 'static;
  type Out: Send + 'static;
  type OutErr: Send + 'static;

  /// Materialize a fresh input and single-subscriber output.
  fn unicast(&self) -> (PipeInput<Self::In, Self::InErr>, UnicastObservable<Self::Out, Self::OutErr>);

  /// Materialize a fresh input and an output safe for many subscribers.
  fn multicast(
    &self, ctx: &ExecutionContext,
  ) -> (PipeInput<Self::In, Self::InErr>, SharedObservable<Self::Out, Self::OutErr>)
  where
    Self::Out: Clone,
    Self::OutErr: Clone,
  {
    republish(self, ctx)
  }

  /// Like [`Pipe::multicast`], with an input any number of threads may
  /// write to concurrently. `overflow` applies when the subscribers cannot
  /// keep pace.
  fn concurrent(
    &self, overflow: OverflowStrategy, ctx: &ExecutionContext,
  ) -> (ConcurrentInput<Self::In, Self::InErr>, SharedObservable<Self::Out, Self::OutErr>)
  where
    Self::InErr: From<BufferOverflowError>,
    Self::Out: Clone,
    Self::OutErr: Clone,
  {
    let (input, output) = self.multicast(ctx);
    (BufferedSubscriber::new(Subscriber::new(input, ctx.clone()), overflow), output)
  }

  /// A recipe applying `op` to the output of this one.
  fn lift<Op>(self, op: Op) -> LiftedPipe<Self, Op>
  where
    Op: Operator<Self::Out, Self::OutErr> + Clone,
  {
    LiftedPipe { pipe: self, op }
  }

  /// A recipe applying `f` to the output of this one.
  fn transform<F, S>(self, f: F) -> TransformedPipe<Self, F>
  where
    F: Fn(UnicastObservable<Self::Out, Self::OutErr>) -> S,
    S: ObservableType,
  {
    TransformedPipe { pipe: self, transform: f }
  }
}

/// Default multicast: republish the unicast output through a fresh
/// [`PublishSubject`] subscribed on `ctx`.
fn republish<P>(
  pipe: &P, ctx: &ExecutionContext,
) -> (PipeInput<P::In, P::InErr>, SharedObservable<P::Out, P::OutErr>)
where
  P: Pipe,
  P::Out: Clone,
  P::OutErr: Clone,
{
  let (input, output) = pipe.unicast();
  let republisher = PublishSubject::<P::Out, P::OutErr>::new();
  tracing::debug!("multicast: republishing the unicast output");
  output.subscribe(republisher.clone(), ctx);
  (input, republisher.into_shared())
}

// ============================================================================
// SubjectPipe
// ============================================================================

type MulticastFn<T, E> =
  fn(&SubjectPipe<T, E>, &ExecutionContext) -> (PipeInput<T, E>, SharedObservable<T, E>);

/// The base recipe: a subject chosen by a [`MulticastStrategy`].
pub struct SubjectPipe<T, E> {
  strategy: MulticastStrategy<T>,
  multicast: MulticastFn<T, E>,
}

impl<T: Clone, E> Clone for SubjectPipe<T, E> {
  fn clone(&self) -> Self { Self { strategy: self.strategy.clone(), multicast: self.multicast } }
}

impl<T, E> SubjectPipe<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  pub fn from_strategy(strategy: MulticastStrategy<T>) -> Self {
    let multicast: MulticastFn<T, E> =
      if strategy.is_multicast_safe() { Self::share_subject } else { republish::<Self> };
    Self { strategy, multicast }
  }

  pub fn publish() -> Self { Self::from_strategy(MulticastStrategy::Publish) }

  pub fn behavior(initial: T) -> Self { Self::from_strategy(MulticastStrategy::Behavior(initial)) }

  /// Pipe over an [`AsyncSubject`](crate::subject::AsyncSubject).
  pub fn asynchronous() -> Self { Self::from_strategy(MulticastStrategy::Async) }

  pub fn replay() -> Self { Self::from_strategy(MulticastStrategy::Replay) }

  pub fn replay_populated(initial: Vec<T>) -> Self {
    Self::from_strategy(MulticastStrategy::ReplayPopulated(initial))
  }

  pub fn replay_limited(capacity: usize) -> Self {
    Self::from_strategy(MulticastStrategy::ReplayLimited(capacity))
  }

  pub fn strategy(&self) -> &MulticastStrategy<T> { &self.strategy }

  fn subject(&self) -> StrategySubject<T, E> { self.strategy.clone().into_subject() }

  fn share_subject(&self, _: &ExecutionContext) -> (PipeInput<T, E>, SharedObservable<T, E>) {
    let subject = self.subject();
    (subject.clone(), subject.into_shared())
  }
}

impl<T, E> Pipe for SubjectPipe<T, E>
where
  T: Clone + Send + 'static,
  E: Clone + Send + 'static,
{
  type In = T;
  type InErr = E;
  type Out = T;
  type OutErr = E;

  fn unicast(&self) -> (PipeInput<T, E>, UnicastObservable<T, E>) {
    let subject = self.subject();
    (subject.clone(), subject.box_it())
  }

  fn multicast(&self, ctx: &ExecutionContext) -> (PipeInput<T, E>, SharedObservable<T, E>) {
    (self.multicast)(self, ctx)
  }
}

// ============================================================================
// Deferred compositions
// ============================================================================

/// A pipe whose output goes through an operator.
#[derive(Clone)]
pub struct LiftedPipe<P, Op> {
  pipe: P,
  op: Op,
}

type OpOut<P, Op> = <Op as Operator<<P as Pipe>::Out, <P as Pipe>::OutErr>>::Out;
type OpOutErr<P, Op> = <Op as Operator<<P as Pipe>::Out, <P as Pipe>::OutErr>>::OutErr;

impl<P, Op> Pipe for LiftedPipe<P, Op>
where
  P: Pipe,
  Op: Operator<P::Out, P::OutErr>
    + ApplyOperator<P::Out, P::OutErr, BoxedObserver<OpOut<P, Op>, OpOutErr<P, Op>>>
    + Clone,
{
  type In = P::In;
  type InErr = P::InErr;
  type Out = OpOut<P, Op>;
  type OutErr = OpOutErr<P, Op>;

  fn unicast(&self) -> (PipeInput<P::In, P::InErr>, UnicastObservable<OpOut<P, Op>, OpOutErr<P, Op>>) {
    let (input, output) = self.pipe.unicast();
    (input, output.lift(self.op.clone()).box_it())
  }
}

/// A pipe whose output goes through an arbitrary producer transformation.
#[derive(Clone)]
pub struct TransformedPipe<P, F> {
  pipe: P,
  transform: F,
}

impl<P, F, S> Pipe for TransformedPipe<P, F>
where
  P: Pipe,
  F: Fn(UnicastObservable<P::Out, P::OutErr>) -> S,
  S: ObservableType
    + CoreObservable<BoxedObserver<<S as ObservableType>::Item, <S as ObservableType>::Err>>
    + Send
    + 'static,
{
  type In = P::In;
  type InErr = P::InErr;
  type Out = <S as ObservableType>::Item;
  type OutErr = <S as ObservableType>::Err;

  fn unicast(
    &self,
  ) -> (PipeInput<P::In, P::InErr>, UnicastObservable<<S as ObservableType>::Item, <S as ObservableType>::Err>)
  {
    let (input, output) = self.pipe.unicast();
    (input, BoxedObservable::new((self.transform)(output)))
  }
}
