//! Subjects: observers that multicast what they receive.
//!
//! Every subject is a [`Subject`] parameterized by a [`ReplayBuffer`]
//! policy, which decides what a subscriber joining late receives:
//!
//! | Subject | Late subscriber receives |
//! |---------|--------------------------|
//! | [`PublishSubject`] | only values pushed after it joined |
//! | [`BehaviorSubject`] | the most recent value (or the seed), then live values |
//! | [`AsyncSubject`] | the last value and completion, only once completed |
//! | [`ReplaySubject`] | the whole history, then live values |
//! | [`ReplayLimitedSubject`] | the retained tail of the history, then live values |
//!
//! A subject moves from [`SubjectState::Active`] to one of the two terminal
//! states and never leaves it. Values pushed afterwards are refused with
//! [`Ack::Stop`](crate::ack::Ack::Stop); subscribers joining afterwards
//! still receive the replay content followed by the stored terminal signal.

mod async_subject;
mod behavior_subject;
mod publish_subject;
mod replay_subject;
mod strategy_subject;
mod subject_core;
mod subject_subscription;
mod subscribers;

pub use async_subject::{AsyncSubject, LastOnComplete};
pub use behavior_subject::{BehaviorSubject, Latest};
pub use publish_subject::{NoReplay, PublishSubject};
pub use replay_subject::{BoundedHistory, History, ReplayLimitedSubject, ReplaySubject};
pub use strategy_subject::StrategySubject;
pub use subject_core::{ReplayBuffer, Subject};
pub use subject_subscription::SubjectSubscription;

/// Lifecycle of a subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubjectState {
  /// Accepting values.
  Active,
  /// Completed; no further input accepted.
  Completed,
  /// Terminated with an error.
  Erred,
}

impl SubjectState {
  #[inline]
  pub fn is_terminated(self) -> bool { self != SubjectState::Active }
}
