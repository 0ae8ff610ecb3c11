//! Guard against external content updates echoing back over a fresh
//! session resolution.
//!
//! When a session resolves, the controller mutates the document and the host
//! later pushes a "content changed" update downstream. Until that settles,
//! an update coming from outside would carry stale content and clobber the
//! resolution. The guard is armed right before the resolving mutation and
//! clears itself after a short window.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::DEFAULT_SUPPRESSION_WINDOW_MS;

/// What happened to an external content update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDecision {
    /// The update was written to the editing surface.
    Applied,
    /// Dropped: inside the suppression window after a resolution.
    Suppressed,
    /// Dropped: a session owns the document.
    SessionActive,
    /// The update matched the content just committed; the guard was released.
    Echo,
}

#[derive(Debug, Clone)]
pub struct ContentSyncGuard {
    window: Duration,
    armed_at: Option<Instant>,
}

impl Default for ContentSyncGuard {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUPPRESSION_WINDOW_MS))
    }
}

impl ContentSyncGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Arms the guard. Re-arming restarts the window.
    pub fn suppress(&mut self) {
        self.armed_at = Some(Instant::now());
    }

    /// True while armed and inside the window.
    pub fn is_suppressed(&mut self) -> bool {
        match self.armed_at {
            Some(armed_at) if armed_at.elapsed() < self.window => true,
            Some(_) => {
                self.armed_at = None;
                false
            }
            None => false,
        }
    }

    /// Disarms immediately.
    pub fn release(&mut self) {
        self.armed_at = None;
    }
}
