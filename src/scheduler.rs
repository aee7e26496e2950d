//! Execution contexts.
//!
//! This crate owns no thread pool of its own. Every materialization and
//! subscription receives an [`ExecutionContext`] explicitly, and the few
//! places that need to run work later (buffer drains, sources resuming after
//! an asynchronous ack) spawn it there.
//!
//! | Scheduler | Feature | Use |
//! |-----------|---------|-----|
//! | [`TestScheduler`] | always | deterministic, manually driven |
//! | [`ThreadPoolScheduler`] | `futures-scheduler` (default) | `futures` thread pool |
//! | [`TokioScheduler`] | `tokio-scheduler` | a tokio runtime handle |

use std::{future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

pub mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
pub mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
pub mod tokio_scheduler;

pub use test_scheduler::TestScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// Something able to run a detached future to completion.
pub trait Scheduler: Send + Sync + 'static {
  fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Cloneable handle to a [`Scheduler`], carried by every
/// [`Subscriber`](crate::subscriber::Subscriber).
#[derive(Clone)]
pub struct ExecutionContext {
  scheduler: Arc<dyn Scheduler>,
}

impl ExecutionContext {
  pub fn new<S: Scheduler>(scheduler: S) -> Self { Self { scheduler: Arc::new(scheduler) } }

  /// Run `task` on this context.
  pub fn spawn<F>(&self, task: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.scheduler.spawn(task.boxed());
  }

  /// Context backed by the process-wide thread pool.
  #[cfg(feature = "futures-scheduler")]
  pub fn thread_pool() -> Self { Self::new(ThreadPoolScheduler::global()) }
}

impl std::fmt::Debug for ExecutionContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("ExecutionContext")
  }
}
