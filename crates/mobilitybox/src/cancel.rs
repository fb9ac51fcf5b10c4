//! Cancellable API calls
//!
//! Every network operation returns a [`PendingCall`]. Cancelling it through
//! its [`CancelHandle`] before it completes means the future never resolves:
//! neither a result nor an error is ever produced for that call.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::watch;
use tracing::debug;

use crate::error::MobilityboxError;

/// Handle used to cancel a [`PendingCall`]
///
/// Cheap to clone; all clones control the same call.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Cancel the call. Idempotent.
    pub fn cancel(&self) {
        if !self.sender.send_replace(true) {
            debug!("Call cancelled");
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    pub(crate) fn token(&self) -> CancelToken {
        CancelToken {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving side of a [`CancelHandle`], threaded through the request pipeline
#[derive(Debug, Clone)]
pub(crate) struct CancelToken {
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the call is cancelled; never resolves otherwise
    pub(crate) async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            // sender gone without cancelling
            std::future::pending::<()>().await;
        }
    }

    /// Suspends forever if the call was cancelled, returns immediately otherwise
    pub(crate) async fn checkpoint(&self) {
        if self.is_cancelled() {
            std::future::pending::<()>().await;
        }
    }
}

type BoxedCall<T> = Pin<Box<dyn Future<Output = Result<T, MobilityboxError>> + Send>>;

/// An in-flight API call
///
/// Resolves to the mapped result, or stays pending forever once cancelled.
#[must_use = "calls do nothing unless awaited"]
pub struct PendingCall<T> {
    handle: CancelHandle,
    future: BoxedCall<T>,
}

impl<T: Send + 'static> PendingCall<T> {
    /// Wrap `work` so that cancellation suppresses its outcome.
    ///
    /// `work` should be created with a token from the same `handle` so that
    /// the intermediate pipeline steps observe cancellation too.
    pub(crate) fn new<F>(handle: CancelHandle, work: F) -> Self
    where
        F: Future<Output = Result<T, MobilityboxError>> + Send + 'static,
    {
        let mut token = handle.token();
        let guard = token.clone();
        let future = async move {
            tokio::select! {
                biased;
                () = token.cancelled() => std::future::pending().await,
                result = work => {
                    guard.checkpoint().await;
                    result
                },
            }
        };

        Self {
            handle,
            future: Box::pin(future),
        }
    }

    /// A call that fails with `error` unless cancelled first
    pub(crate) fn failed(error: MobilityboxError) -> Self {
        Self::new(CancelHandle::new(), async move { Err(error) })
    }

    /// Handle that can cancel this call from elsewhere
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Cancel this call
    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl<T> Future for PendingCall<T> {
    type Output = Result<T, MobilityboxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for PendingCall<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("cancelled", &self.handle.is_cancelled())
            .finish_non_exhaustive()
    }
}
