//! # rxflow: backpressure-aware stream composition
//!
//! Operators are chained onto producers through a single primitive,
//! `lift`, and every chain honours the same acknowledgement protocol: a
//! producer sends the next value only once the previous one was
//! acknowledged. Pipes expose a chain as a channel with an input observer
//! and an output observable, under a selectable multicast strategy.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxflow::prelude::*;
//!
//! let ctx = TestScheduler::new().context();
//! let seen = MutArc::own(vec![]);
//! let c_seen = seen.clone();
//!
//! from_iter::<_, ()>(1..=3)
//!   .map(|v| v * 2)
//!   .concat_map(|v| from_iter::<_, ()>([v, v + 1]))
//!   .subscribe(FnMutObserver(move |v| c_seen.rc_deref_mut().push(v)), &ctx);
//!
//! assert_eq!(*seen.rc_deref_mut(), vec![2, 3, 4, 5, 6, 7]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observer`] | Consumes `next`, `error`, and `complete`; `next` answers with an [`AckFuture`] |
//! | [`Observable`] | Subscribes an observer on an explicit [`ExecutionContext`] |
//! | [`ProducerLike`] | `map`, `concat_map` and friends, all built on `lift` |
//! | [`Pipe`] | Recipe materializing an input observer and an output observable |
//! | [`MulticastStrategy`] | What late subscribers of a pipe receive |
//! | [`BufferedSubscriber`] | Lets several threads write into one consumer |
//! | [`Subscription`] | Handle to cancel an active subscription |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ExecutionContext::thread_pool`]
//!   backed by the `futures` thread pool
//! - **`tokio-scheduler`**: an execution context over a tokio runtime handle
//!
//! [`Observer`]: observer::Observer
//! [`AckFuture`]: ack::AckFuture
//! [`Observable`]: observable::Observable
//! [`ExecutionContext`]: scheduler::ExecutionContext
//! [`ExecutionContext::thread_pool`]: scheduler::ExecutionContext::thread_pool
//! [`ProducerLike`]: producer::ProducerLike
//! [`Pipe`]: pipe::Pipe
//! [`MulticastStrategy`]: multicast_strategy::MulticastStrategy
//! [`BufferedSubscriber`]: buffered::BufferedSubscriber
//! [`Subscription`]: subscription::Subscription

pub mod ack;
pub mod buffered;
pub mod error;
pub mod multicast_strategy;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod pipe;
pub mod prelude;
pub mod producer;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;

// Bring the README into Cargo-driven doctests.
#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
