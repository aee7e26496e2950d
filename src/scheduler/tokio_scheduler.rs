use futures::future::BoxFuture;
use tokio::runtime::{Handle, TryCurrentError};

use super::Scheduler;

/// Runs tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { Self { handle } }

  /// Scheduler over the runtime the caller is running in.
  pub fn current() -> Result<Self, TryCurrentError> { Ok(Self::new(Handle::try_current()?)) }
}

impl Scheduler for TokioScheduler {
  fn spawn(&self, task: BoxFuture<'static, ()>) {
    // Detached; the join handle is not needed.
    drop(self.handle.spawn(task));
  }
}

#[cfg(test)]
mod tests {
  use futures::channel::oneshot;

  use super::*;
  use crate::scheduler::ExecutionContext;

  #[rxflow_macro::test(shared)]
  async fn spawn_on_current_runtime() {
    let ctx = ExecutionContext::new(TokioScheduler::current().unwrap());
    let (tx, rx) = oneshot::channel();
    ctx.spawn(async move {
      let _ = tx.send(42);
    });
    assert_eq!(rx.await.unwrap(), 42);
  }
}
