//! Operators and the `lift` primitive.
//!
//! An operator is a recipe turning a downstream subscriber into an upstream
//! one. Lifting an operator onto a producer yields a new producer
//! ([`Lifted`]) that, when subscribed, applies the operator and subscribes
//! the source with the resulting upstream subscriber.
//!
//! The operator may also return a teardown. The lifted subscription pairs
//! the source's subscription with that teardown, so cancelling the result
//! reaches the source and anything the operator started on its own (for
//! example the inner subscription of `concat_map`).

use crate::{
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Subscription, TupleSubscription},
};

pub mod concat_map;
pub mod map;

pub use concat_map::{ConcatMapOp, DelayErrors, Direct, ErrorMode, FailFast, InnerKind, ViaFuture};
pub use map::MapOp;

/// Declares what an operator turns a stream of `In` / `InErr` into.
pub trait Operator<In, InErr>: Send + 'static {
  type Out: Send + 'static;
  type OutErr: Send + 'static;
}

/// Builds the upstream observer of an operator for a downstream observer
/// `O`.
pub trait ApplyOperator<In, InErr, O>: Operator<In, InErr> {
  type Upstream: Observer<In, InErr>;
  type Teardown: Subscription + Send + 'static;

  fn apply(self, downstream: Subscriber<O>) -> (Subscriber<Self::Upstream>, Self::Teardown);
}

/// A producer with an operator lifted onto it.
#[derive(Clone)]
pub struct Lifted<S, Op> {
  source: S,
  op: Op,
}

impl<S, Op> Lifted<S, Op> {
  pub fn new(source: S, op: Op) -> Self { Self { source, op } }
}

impl<S, Op> ObservableType for Lifted<S, Op>
where
  S: ObservableType,
  Op: Operator<<S as ObservableType>::Item, <S as ObservableType>::Err>,
{
  type Item = <Op as Operator<<S as ObservableType>::Item, <S as ObservableType>::Err>>::Out;
  type Err = <Op as Operator<<S as ObservableType>::Item, <S as ObservableType>::Err>>::OutErr;
}

// Upstream observer and teardown of `Op` lifted onto `S`, feeding `O`.
type LiftedUpstream<S, Op, O> = <Op as ApplyOperator<
  <S as ObservableType>::Item,
  <S as ObservableType>::Err,
  O,
>>::Upstream;
type LiftedTeardown<S, Op, O> = <Op as ApplyOperator<
  <S as ObservableType>::Item,
  <S as ObservableType>::Err,
  O,
>>::Teardown;

impl<S, Op, O> CoreObservable<O> for Lifted<S, Op>
where
  S: ObservableType,
  Op: ApplyOperator<<S as ObservableType>::Item, <S as ObservableType>::Err, O>,
  S: CoreObservable<LiftedUpstream<S, Op, O>>,
{
  type Unsub = TupleSubscription<
    <S as CoreObservable<LiftedUpstream<S, Op, O>>>::Unsub,
    LiftedTeardown<S, Op, O>,
  >;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> Self::Unsub {
    let (upstream, teardown) = self.op.apply(subscriber);
    let unsub = self.source.actual_subscribe(upstream);
    TupleSubscription::new(unsub, teardown)
  }
}

/// `f` followed by `g`, as a single operator.
#[derive(Clone)]
pub struct Compose<F, G> {
  f: F,
  g: G,
}

/// Compose two operators: values flow through `f` first, then `g`.
///
/// `source.lift(compose(f, g))` behaves exactly like
/// `source.lift(f).lift(g)`.
pub fn compose<F, G>(f: F, g: G) -> Compose<F, G> { Compose { f, g } }

impl<In, InErr, F, G> Operator<In, InErr> for Compose<F, G>
where
  F: Operator<In, InErr>,
  G: Operator<F::Out, F::OutErr>,
{
  type Out = G::Out;
  type OutErr = G::OutErr;
}

// Upstream observer and teardown of `g` when feeding `O`.
type GUpstream<F, G, In, InErr, O> = <G as ApplyOperator<
  <F as Operator<In, InErr>>::Out,
  <F as Operator<In, InErr>>::OutErr,
  O,
>>::Upstream;
type GTeardown<F, G, In, InErr, O> = <G as ApplyOperator<
  <F as Operator<In, InErr>>::Out,
  <F as Operator<In, InErr>>::OutErr,
  O,
>>::Teardown;

impl<In, InErr, O, F, G> ApplyOperator<In, InErr, O> for Compose<F, G>
where
  F: Operator<In, InErr>,
  G: ApplyOperator<<F as Operator<In, InErr>>::Out, <F as Operator<In, InErr>>::OutErr, O>,
  F: ApplyOperator<In, InErr, GUpstream<F, G, In, InErr, O>>,
{
  type Upstream = <F as ApplyOperator<In, InErr, GUpstream<F, G, In, InErr, O>>>::Upstream;
  type Teardown = TupleSubscription<
    <F as ApplyOperator<In, InErr, GUpstream<F, G, In, InErr, O>>>::Teardown,
    GTeardown<F, G, In, InErr, O>,
  >;

  fn apply(self, downstream: Subscriber<O>) -> (Subscriber<Self::Upstream>, Self::Teardown) {
    let (middle, g_teardown) = self.g.apply(downstream);
    let (upstream, f_teardown) = self.f.apply(middle);
    (upstream, TupleSubscription::new(f_teardown, g_teardown))
  }
}
