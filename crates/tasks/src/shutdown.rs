//! One-shot shutdown channel.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::{
    FutureExt,
    future::{FusedFuture, Shared},
};
use tokio::sync::oneshot;

/// A future that resolves when the paired [`Signal`] fires or is dropped.
///
/// Cloning is cheap; every clone resolves on the same signal.
#[derive(Debug, Clone)]
#[must_use = "futures do nothing unless polled"]
pub struct Shutdown(Shared<oneshot::Receiver<()>>);

impl Shutdown {
    /// Returns `true` if the signal has already been observed by this clone.
    pub fn is_terminated(&self) -> bool {
        self.0.is_terminated()
    }
}

impl Future for Shutdown {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let pin = self.get_mut();
        if pin.0.is_terminated() || pin.0.poll_unpin(cx).is_ready() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Fires the shutdown channel.
///
/// Dropping the signal without firing it also resolves every [`Shutdown`].
#[derive(Debug)]
pub struct Signal(oneshot::Sender<()>);

impl Signal {
    /// Fire the signal, waking every [`Shutdown`] clone.
    pub fn fire(self) {
        let _ = self.0.send(());
    }
}

/// Create a new shutdown channel.
pub fn signal() -> (Signal, Shutdown) {
    let (sender, receiver) = oneshot::channel();
    (Signal(sender), Shutdown(receiver.shared()))
}
