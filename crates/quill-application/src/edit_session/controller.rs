//! Edit-session state machine.
//!
//! One controller per editor. It owns the session record and is the only
//! writer of the document while a session is active:
//!
//! ```text
//! Idle --begin_action--> Capturing --(sync)--> Streaming --finish--> Reviewing
//!   ^                                             |                     |
//!   +---------- accept / discard / cancel / error +---------------------+
//! ```
//!
//! Stream callbacks arrive as [`StreamEvent`]s on an internal channel and are
//! applied by [`EditSessionController::next_update`] (or
//! [`handle_stream_event`](EditSessionController::handle_stream_event)) on
//! the owner's task, so document mutation never happens concurrently.

use quill_core::AssistError;
use quill_core::action::{Action, ActionCatalog, InputScope};
use quill_core::editor::{EditingSurface, NotificationSink, Selection};
use quill_core::config::DEFAULT_NOTICE_DURATION_MS;
use quill_core::session::{Anchor, Phase, PreviewPolicy, SessionState};
use quill_core::sync_guard::{ContentSyncGuard, SyncDecision};
use quill_interaction::{ChannelObserver, StreamClient, StreamEvent, StreamEventKind, StreamHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::mpsc::error::TryRecvError;
use uuid::Uuid;

use super::resolution::{Preview, Resolution, ResolutionKind};
use crate::trigger::TriggerSurface;

pub struct EditSessionController {
    client: StreamClient,
    catalog: ActionCatalog,
    surface: Box<dyn EditingSurface>,
    notifier: Arc<dyn NotificationSink>,
    guard: ContentSyncGuard,
    state: SessionState,
    handle: Option<StreamHandle>,
    /// Editability before a buffered session locked the surface.
    prior_editable: Option<bool>,
    /// Characters a live session has put into the document so far.
    live_inserted: usize,
    events_tx: UnboundedSender<StreamEvent>,
    events_rx: UnboundedReceiver<StreamEvent>,
    notice_duration: Duration,
    /// Document content right after the last resolution, to recognise its echo.
    last_committed: Option<String>,
}

impl EditSessionController {
    pub fn new(
        client: StreamClient,
        surface: Box<dyn EditingSurface>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            client,
            catalog: ActionCatalog::new(),
            surface,
            notifier,
            guard: ContentSyncGuard::default(),
            state: SessionState::idle(),
            handle: None,
            prior_editable: None,
            live_inserted: 0,
            events_tx,
            events_rx,
            notice_duration: Duration::from_millis(DEFAULT_NOTICE_DURATION_MS),
            last_committed: None,
        }
    }

    pub fn with_suppression_window(mut self, window: Duration) -> Self {
        self.guard = ContentSyncGuard::new(window);
        self
    }

    pub fn with_notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn surface(&self) -> &dyn EditingSurface {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> &mut dyn EditingSurface {
        self.surface.as_mut()
    }

    /// Whether external content updates are currently being dropped.
    pub fn is_suppressed(&mut self) -> bool {
        let suppressed = self.guard.is_suppressed();
        if !suppressed {
            self.last_committed = None;
        }
        suppressed
    }

    /// Starts a session from a trigger surface, using its preview policy.
    pub fn trigger(&mut self, surface: TriggerSurface, action: Action) -> Result<Uuid, AssistError> {
        self.begin_action(action, surface.default_policy())
    }

    /// Starts a new session and returns its id.
    ///
    /// An active session is discarded first, without a notice. Blank input
    /// and configuration problems are reported synchronously, shown as a
    /// notice, and leave the document untouched.
    pub fn begin_action(
        &mut self,
        action: Action,
        policy: PreviewPolicy,
    ) -> Result<Uuid, AssistError> {
        if !self.state.is_idle() {
            tracing::info!(
                "[EditSession] superseding session {} ({})",
                self.state.id(),
                self.state.phase()
            );
            self.undo_and_reset(ResolutionKind::Discarded);
        }

        self.state = SessionState::begin(action.clone(), policy);
        let session_id = self.state.id();

        let selection = self.surface.selection();
        let (input, removed) = self.capture_input(&action, selection);

        let prepared = self
            .catalog
            .build_request(&action, &input)
            .and_then(|request| self.client.prepare(&request));
        let stream_request = match prepared {
            Ok(stream_request) => stream_request,
            Err(err) => {
                tracing::info!("[EditSession] {} rejected: {}", action.kind(), err);
                self.notify(&err);
                self.state = SessionState::idle();
                return Err(err);
            }
        };

        let position = removed.map_or(selection.to, |range| range.from);
        let anchor = Anchor {
            position,
            coords: self.surface.coordinates_of(position),
        };
        let original_text = match removed {
            Some(range) => {
                self.surface.delete_range(range.from, range.to);
                input
            }
            None => String::new(),
        };
        self.surface.select(Selection::cursor(position));
        self.state.latch(anchor, original_text);
        self.live_inserted = 0;

        if policy == PreviewPolicy::Buffered {
            self.prior_editable = Some(self.surface.is_editable());
            self.surface.set_editable(false);
        }

        let observer = ChannelObserver::new(session_id, self.events_tx.clone());
        self.handle = Some(self.client.open(stream_request, observer));
        tracing::info!(
            "[EditSession] session {} started: action={}, policy={}, anchor={}",
            session_id,
            action.kind(),
            policy,
            position
        );
        Ok(session_id)
    }

    /// Applies one stream event. Events for another session, or arriving
    /// outside `Streaming`, are dropped.
    pub fn handle_stream_event(&mut self, event: StreamEvent) -> Option<Resolution> {
        if event.session_id != self.state.id() || self.state.phase() != Phase::Streaming {
            tracing::debug!(
                "[EditSession] dropping stale event for session {}",
                event.session_id
            );
            return None;
        }

        match event.kind {
            StreamEventKind::Fragment(fragment) => {
                self.state.append_fragment(&fragment);
                if self.state.policy() == PreviewPolicy::Live {
                    let position = self.live_position();
                    self.surface.insert_at(position, &fragment);
                    self.live_inserted += fragment.chars().count();
                    self.surface.select(Selection::cursor(self.live_position()));
                }
                None
            }
            StreamEventKind::Finished(full_text) => {
                self.handle = None;
                if full_text != self.state.generated_text() {
                    tracing::warn!(
                        "[EditSession] stream total differs from applied fragments ({} vs {} chars)",
                        full_text.chars().count(),
                        self.state.generated_chars()
                    );
                }
                self.state.freeze();
                tracing::info!(
                    "[EditSession] session {} finished: {} chars",
                    self.state.id(),
                    self.state.generated_chars()
                );
                match self.state.policy() {
                    PreviewPolicy::Buffered => None,
                    PreviewPolicy::Live => Some(self.commit(ResolutionKind::Completed)),
                }
            }
            StreamEventKind::Failed(err) => Some(self.fail(err)),
        }
    }

    /// Waits for the next stream event and applies it.
    pub async fn next_update(&mut self) -> Option<Resolution> {
        let event = self.events_rx.recv().await?;
        self.handle_stream_event(event)
    }

    /// Applies every event already queued, without waiting.
    pub fn drain_pending(&mut self) -> Option<Resolution> {
        let mut resolution = None;
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    if let Some(resolved) = self.handle_stream_event(event) {
                        resolution = Some(resolved);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        resolution
    }

    /// Applies events until the session leaves `Streaming`.
    pub async fn run_until_settled(&mut self) -> Option<Resolution> {
        while self.state.phase() == Phase::Streaming {
            if let Some(resolution) = self.next_update().await {
                return Some(resolution);
            }
        }
        None
    }

    /// Commits the generated text. During `Streaming` this keeps what has
    /// arrived so far.
    pub fn accept(&mut self) -> Option<Resolution> {
        if !self.state.phase().is_resolvable() {
            return None;
        }
        Some(self.commit(ResolutionKind::Accepted))
    }

    /// Throws the generated text away and restores the original.
    pub fn discard(&mut self) -> Option<Resolution> {
        if !self.state.phase().is_resolvable() {
            return None;
        }
        Some(self.undo_and_reset(ResolutionKind::Discarded))
    }

    /// Stops the session.
    ///
    /// Buffered sessions behave like [`discard`](Self::discard). Live
    /// sessions stop early and keep what was already inserted, unless
    /// nothing was, in which case the original is restored.
    pub fn cancel(&mut self) -> Option<Resolution> {
        if !self.state.phase().is_resolvable() {
            return None;
        }
        if self.state.policy() == PreviewPolicy::Live && self.live_inserted > 0 {
            return Some(self.commit(ResolutionKind::Cancelled));
        }
        Some(self.undo_and_reset(ResolutionKind::Cancelled))
    }

    /// Ghost preview for a buffered session in `Streaming` or `Reviewing`.
    pub fn preview(&self) -> Option<Preview> {
        if self.state.policy() != PreviewPolicy::Buffered || !self.state.phase().is_resolvable() {
            return None;
        }
        let anchor = self.state.anchor()?;
        Some(Preview {
            text: self.state.generated_text().to_string(),
            position: anchor.position,
            coords: anchor.coords,
            streaming: self.state.phase() == Phase::Streaming,
        })
    }

    /// Offers externally-sourced document content to the editing surface.
    pub fn apply_external_content(&mut self, content: &str) -> SyncDecision {
        if !self.state.is_idle() {
            tracing::debug!("[EditSession] external update ignored: session active");
            return SyncDecision::SessionActive;
        }
        if self.guard.is_suppressed() {
            if self.last_committed.as_deref() == Some(content) {
                self.last_committed = None;
                self.guard.release();
                return SyncDecision::Echo;
            }
            tracing::debug!("[EditSession] external update ignored: inside suppression window");
            return SyncDecision::Suppressed;
        }
        // An echo only counts inside the window that follows its resolution.
        self.last_committed = None;
        self.surface.set_content(content);
        SyncDecision::Applied
    }

    fn capture_input(&self, action: &Action, selection: Selection) -> (String, Option<Selection>) {
        match action.input_scope() {
            InputScope::Selection => (
                self.surface.text(selection.from, selection.to),
                (!selection.is_empty()).then_some(selection),
            ),
            InputScope::PrecedingText => (self.surface.text(0, selection.to), None),
            InputScope::SelectionOrNone if !selection.is_empty() => (
                self.surface.text(selection.from, selection.to),
                Some(selection),
            ),
            InputScope::SelectionOrNone | InputScope::None => (String::new(), None),
        }
    }

    fn anchor_position(&self) -> usize {
        self.state.anchor().map_or(0, |anchor| anchor.position)
    }

    fn live_position(&self) -> usize {
        self.anchor_position() + self.live_inserted
    }

    fn cancel_stream(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
    }

    /// Leaves the generated text in the document.
    fn commit(&mut self, kind: ResolutionKind) -> Resolution {
        self.state.begin_resolving();
        self.cancel_stream();
        self.guard.suppress();

        let position = self.anchor_position();
        let end = match self.state.policy() {
            PreviewPolicy::Buffered => {
                let generated = self.state.generated_text().to_string();
                if !generated.is_empty() {
                    self.surface.insert_at(position, &generated);
                }
                position + self.state.generated_chars()
            }
            PreviewPolicy::Live => self.live_position(),
        };
        self.surface.select(Selection::cursor(end));

        self.finish(kind)
    }

    /// Removes anything the session put into the document and restores the
    /// original text, selected.
    fn undo_and_reset(&mut self, kind: ResolutionKind) -> Resolution {
        self.state.begin_resolving();
        self.cancel_stream();
        self.guard.suppress();

        let position = self.anchor_position();
        if self.live_inserted > 0 {
            self.surface
                .delete_range(position, position + self.live_inserted);
            self.live_inserted = 0;
        }
        let original = self.state.original_text().to_string();
        if original.is_empty() {
            self.surface.select(Selection::cursor(position));
        } else {
            self.surface.insert_at(position, &original);
            self.surface.select(Selection::new(
                position,
                position + original.chars().count(),
            ));
        }

        self.finish(kind)
    }

    fn fail(&mut self, err: AssistError) -> Resolution {
        tracing::warn!(
            "[EditSession] session {} failed: {}",
            self.state.id(),
            err
        );
        self.notify(&err);
        self.undo_and_reset(ResolutionKind::Failed)
    }

    /// Restores editability and resets to a fresh idle record.
    fn finish(&mut self, kind: ResolutionKind) -> Resolution {
        if let Some(editable) = self.prior_editable.take() {
            self.surface.set_editable(editable);
        }
        let content = self.surface.content();
        self.last_committed = Some(content.clone());

        tracing::info!(
            "[EditSession] session {} resolved: {}",
            self.state.id(),
            kind
        );
        self.state = SessionState::idle();
        self.live_inserted = 0;

        Resolution { kind, content }
    }

    fn notify(&self, err: &AssistError) {
        if err.is_surfaced() {
            self.notifier.show(&err.notice(), self.notice_duration);
        }
    }
}

impl Drop for EditSessionController {
    fn drop(&mut self) {
        self.cancel_stream();
    }
}
