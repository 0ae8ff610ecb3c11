//! Handle to one outstanding stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Cancellation handle for a stream started by
/// [`StreamClient::start`](super::StreamClient::start).
///
/// The stream terminates exactly once: by `cancel`, by finishing or by
/// failing. Whichever claims the handle first wins and the others become
/// no-ops.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    token: CancellationToken,
    settled: AtomicBool,
}

impl StreamHandle {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                token: CancellationToken::new(),
                settled: AtomicBool::new(false),
            }),
        }
    }

    /// Aborts the transfer. Idempotent; never triggers `on_error`.
    ///
    /// Returns `true` if this call is what terminated the stream.
    pub fn cancel(&self) -> bool {
        let claimed = self.settle();
        self.inner.token.cancel();
        claimed
    }

    /// Whether the stream has terminated in any way.
    pub fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Claims the terminal outcome. `true` only for the first caller.
    pub(crate) fn settle(&self) -> bool {
        !self.inner.settled.swap(true, Ordering::AcqRel)
    }

    /// Callbacks may still be delivered.
    pub(crate) fn is_live(&self) -> bool {
        !self.is_settled() && !self.inner.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent() {
        let handle = StreamHandle::new();
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(handle.is_cancelled());
        assert!(!handle.is_live());
    }

    #[test]
    fn cancel_after_settle_does_not_claim() {
        let handle = StreamHandle::new();
        assert!(handle.settle());
        assert!(!handle.cancel());
        assert!(!handle.settle());
    }
}
