use super::{
  AsyncSubject, BehaviorSubject, PublishSubject, ReplayLimitedSubject, ReplaySubject, SubjectState,
};
use crate::{
  ack::AckFuture,
  observable::{CoreObservable, ObservableType},
  observer::Observer,
  subscriber::Subscriber,
  subscription::BoxedSubscription,
};

/// A subject built from a [`MulticastStrategy`](crate::MulticastStrategy).
///
/// One variant per kind of subject; `ReplayPopulated` materializes as a
/// [`StrategySubject::Replay`] with a seeded history.
pub enum StrategySubject<Item, Err> {
  Publish(PublishSubject<Item, Err>),
  Behavior(BehaviorSubject<Item, Err>),
  Async(AsyncSubject<Item, Err>),
  Replay(ReplaySubject<Item, Err>),
  ReplayLimited(ReplayLimitedSubject<Item, Err>),
}

macro_rules! dispatch {
  ($subject:expr, $s:ident => $body:expr) => {
    match $subject {
      StrategySubject::Publish($s) => $body,
      StrategySubject::Behavior($s) => $body,
      StrategySubject::Async($s) => $body,
      StrategySubject::Replay($s) => $body,
      StrategySubject::ReplayLimited($s) => $body,
    }
  };
}

impl<Item, Err> Clone for StrategySubject<Item, Err> {
  fn clone(&self) -> Self {
    match self {
      StrategySubject::Publish(s) => StrategySubject::Publish(s.clone()),
      StrategySubject::Behavior(s) => StrategySubject::Behavior(s.clone()),
      StrategySubject::Async(s) => StrategySubject::Async(s.clone()),
      StrategySubject::Replay(s) => StrategySubject::Replay(s.clone()),
      StrategySubject::ReplayLimited(s) => StrategySubject::ReplayLimited(s.clone()),
    }
  }
}

impl<Item, Err> StrategySubject<Item, Err> {
  pub fn state(&self) -> SubjectState { dispatch!(self, s => s.state()) }

  pub fn observer_count(&self) -> usize { dispatch!(self, s => s.observer_count()) }
}

impl<Item, Err> ObservableType for StrategySubject<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> Observer<Item, Err> for StrategySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn next(&mut self, value: Item) -> AckFuture { dispatch!(self, s => s.next(value)) }

  fn error(self, err: Err) { dispatch!(self, s => s.error(err)) }

  fn complete(self) { dispatch!(self, s => s.complete()) }

  fn is_closed(&self) -> bool { self.state() != SubjectState::Active }
}

impl<Item, Err, O> CoreObservable<O> for StrategySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  O: Observer<Item, Err>,
{
  type Unsub = BoxedSubscription;

  fn actual_subscribe(self, subscriber: Subscriber<O>) -> BoxedSubscription {
    dispatch!(self, s => BoxedSubscription::new(s.actual_subscribe(subscriber)))
  }
}
