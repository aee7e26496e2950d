//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Backpressure protocol
pub use crate::ack::{Ack, AckFuture};
// Buffering
pub use crate::buffered::{BufferedSubscriber, OverflowStrategy};
// Errors
pub use crate::error::{BufferOverflowError, CompositeError, RxError};
// Multicast
pub use crate::multicast_strategy::MulticastStrategy;
// Core traits and creation
pub use crate::observable::{
  empty, from_future, from_iter, from_results, never, of, throw_err, BoxedObservable,
  CoreObservable, Observable, ObservableType, SharedObservable, UnicastObservable,
};
// Observers
pub use crate::observer::{BoxedObserver, FnMutObserver, Observer, ObserverAll, SafeObserver};
// Operators
pub use crate::ops::{compose, ConcatMapOp, DelayErrors, FailFast, Lifted, MapOp, Operator};
// Pipes
pub use crate::pipe::{ConcurrentInput, LiftedPipe, Pipe, SubjectPipe, TransformedPipe};
pub use crate::producer::ProducerLike;
pub use crate::rc::MutArc;
// Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{ExecutionContext, Scheduler, TestScheduler};
// Subjects
pub use crate::subject::{
  AsyncSubject, BehaviorSubject, PublishSubject, ReplayBuffer, ReplayLimitedSubject,
  ReplaySubject, StrategySubject, Subject, SubjectState,
};
pub use crate::subscriber::Subscriber;
// Subscriptions
pub use crate::subscription::{
  BooleanSubscription, BoxedSubscription, SerialSubscription, Subscription, TupleSubscription,
};
