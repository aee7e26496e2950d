//! Acknowledgement protocol between producers and observers.
//!
//! Every call to [`Observer::next`](crate::observer::Observer::next) returns
//! an [`AckFuture`]. A producer must wait until that ack resolves to
//! [`Ack::Continue`] before it sends the next value, and must stop sending
//! after [`Ack::Stop`].
//!
//! Most observers answer synchronously with [`AckFuture::Now`], which lets
//! sources run a tight loop with no allocation. Observers that need to
//! suspend the producer (for example `concat_map` while an inner producer is
//! running) answer with [`AckFuture::Later`].

use std::{
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use futures::{
  channel::oneshot,
  future::{BoxFuture, FutureExt},
};

/// Verdict of an observer about the value it just received.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ack {
  /// The observer is ready for the next value.
  Continue,
  /// The observer will accept nothing more; the producer must stop.
  Stop,
}

/// A possibly asynchronous [`Ack`].
#[must_use = "a producer must wait for the ack before sending the next value"]
pub enum AckFuture {
  /// The ack is already known.
  Now(Ack),
  /// The ack resolves later.
  Later(BoxFuture<'static, Ack>),
}

impl AckFuture {
  #[inline]
  pub fn continue_now() -> Self { AckFuture::Now(Ack::Continue) }

  #[inline]
  pub fn stop_now() -> Self { AckFuture::Now(Ack::Stop) }

  /// Wrap any future producing an [`Ack`].
  pub fn later<F>(fut: F) -> Self
  where
    F: Future<Output = Ack> + Send + 'static,
  {
    AckFuture::Later(fut.boxed())
  }

  /// An ack resolved by the sending half of a oneshot channel.
  ///
  /// A dropped sender resolves to [`Ack::Stop`].
  pub fn from_receiver(rx: oneshot::Receiver<Ack>) -> Self {
    AckFuture::later(rx.map(|res| res.unwrap_or(Ack::Stop)))
  }

  /// Returns the ack if it is synchronously available.
  #[inline]
  pub fn now(&self) -> Option<Ack> {
    match self {
      AckFuture::Now(ack) => Some(*ack),
      AckFuture::Later(_) => None,
    }
  }
}

impl From<Ack> for AckFuture {
  #[inline]
  fn from(ack: Ack) -> Self { AckFuture::Now(ack) }
}

impl Future for AckFuture {
  type Output = Ack;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Ack> {
    match self.get_mut() {
      AckFuture::Now(ack) => Poll::Ready(*ack),
      AckFuture::Later(fut) => fut.poll_unpin(cx),
    }
  }
}

impl std::fmt::Debug for AckFuture {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AckFuture::Now(ack) => f.debug_tuple("Now").field(ack).finish(),
      AckFuture::Later(_) => f.write_str("Later(..)"),
    }
  }
}
