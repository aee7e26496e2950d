use futures::{executor::ThreadPool, future::BoxFuture};
use once_cell::sync::Lazy;

use super::Scheduler;

static DEFAULT_RUNTIME: Lazy<ThreadPool> =
  Lazy::new(|| ThreadPool::new().expect("create the default thread pool failed."));

/// Runs tasks on a `futures` thread pool.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  /// A scheduler over a dedicated pool.
  pub fn new() -> std::io::Result<Self> { Ok(Self { pool: ThreadPool::new()? }) }

  pub fn from_pool(pool: ThreadPool) -> Self { Self { pool } }

  /// A scheduler over the lazily created process-wide pool.
  pub fn global() -> Self { Self { pool: DEFAULT_RUNTIME.clone() } }
}

impl Scheduler for ThreadPoolScheduler {
  fn spawn(&self, task: BoxFuture<'static, ()>) { self.pool.spawn_ok(task); }
}

#[cfg(test)]
mod tests {
  use futures::{channel::oneshot, executor::block_on};

  use super::*;
  use crate::scheduler::ExecutionContext;

  #[rxflow_macro::test]
  fn spawned_task_runs() {
    let ctx = ExecutionContext::thread_pool();
    let (tx, rx) = oneshot::channel();
    ctx.spawn(async move {
      let _ = tx.send(std::thread::current().id());
    });
    let worker = block_on(rx).unwrap();
    assert_ne!(worker, std::thread::current().id());
  }
}
