//! Selection of the subject backing a pipe.

use crate::subject::{
  AsyncSubject, BehaviorSubject, PublishSubject, ReplayLimitedSubject, ReplaySubject,
  StrategySubject,
};

/// Which subject a pipe materializes, and therefore what late subscribers
/// see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MulticastStrategy<T> {
  /// No replay.
  Publish,
  /// Most recent value, seeded with the given one.
  Behavior(T),
  /// Last value, on completion only.
  Async,
  /// Unbounded history.
  Replay,
  /// Unbounded history seeded with the given values.
  ReplayPopulated(Vec<T>),
  /// History bounded to the given capacity (at least 1).
  ReplayLimited(usize),
}

impl<T> MulticastStrategy<T> {
  /// Whether the materialized subject can hand out its raw output to any
  /// number of subscribers, without a republishing subject in between.
  pub fn is_multicast_safe(&self) -> bool {
    matches!(
      self,
      MulticastStrategy::Publish | MulticastStrategy::Behavior(_) | MulticastStrategy::Async
    )
  }

  /// Build a fresh subject implementing this strategy.
  pub fn into_subject<Err>(self) -> StrategySubject<T, Err> {
    match self {
      MulticastStrategy::Publish => StrategySubject::Publish(PublishSubject::new()),
      MulticastStrategy::Behavior(initial) => {
        StrategySubject::Behavior(BehaviorSubject::new(initial))
      }
      MulticastStrategy::Async => StrategySubject::Async(AsyncSubject::new()),
      MulticastStrategy::Replay => StrategySubject::Replay(ReplaySubject::new()),
      MulticastStrategy::ReplayPopulated(initial) => {
        StrategySubject::Replay(ReplaySubject::with_history(initial))
      }
      MulticastStrategy::ReplayLimited(capacity) => {
        StrategySubject::ReplayLimited(ReplayLimitedSubject::new(capacity))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::prelude::*;

  #[rxflow_macro::test]
  fn safe_strategies() {
    assert!(MulticastStrategy::<i32>::Publish.is_multicast_safe());
    assert!(MulticastStrategy::Behavior(0).is_multicast_safe());
    assert!(MulticastStrategy::<i32>::Async.is_multicast_safe());
    assert!(!MulticastStrategy::<i32>::Replay.is_multicast_safe());
    assert!(!MulticastStrategy::ReplayPopulated(vec![1]).is_multicast_safe());
    assert!(!MulticastStrategy::<i32>::ReplayLimited(1).is_multicast_safe());
  }

  #[rxflow_macro::test]
  fn every_strategy_gets_its_subject() {
    let kinds: Vec<_> = [
      MulticastStrategy::Publish,
      MulticastStrategy::Behavior(0),
      MulticastStrategy::Async,
      MulticastStrategy::Replay,
      MulticastStrategy::ReplayPopulated(vec![1, 2]),
      MulticastStrategy::ReplayLimited(0),
    ]
    .into_iter()
    .map(|strategy| match strategy.into_subject::<()>() {
      StrategySubject::Publish(_) => "publish",
      StrategySubject::Behavior(_) => "behavior",
      StrategySubject::Async(_) => "async",
      StrategySubject::Replay(_) => "replay",
      StrategySubject::ReplayLimited(_) => "replay_limited",
    })
    .collect();
    assert_eq!(kinds, ["publish", "behavior", "async", "replay", "replay", "replay_limited"]);
  }

  #[rxflow_macro::test]
  fn populated_replay_starts_with_the_seed() {
    let scheduler = TestScheduler::new();
    let subject = MulticastStrategy::ReplayPopulated(vec![1, 2]).into_subject::<()>();
    let seen = MutArc::own(vec![]);
    let c_seen = seen.clone();
    subject.subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), &scheduler.context());
    scheduler.run_until_idle();
    assert_eq!(*seen.rc_deref_mut(), vec![1, 2]);
  }
}
