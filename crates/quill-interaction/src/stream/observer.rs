//! Receivers of stream callbacks.

use quill_core::AssistError;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Callbacks for one stream. At most one of `on_finish` / `on_error` is
/// called, and nothing is called after it or after a cancel.
pub trait StreamObserver: Send + 'static {
    fn on_fragment(&mut self, fragment: &str);

    /// Normal end, with the concatenation of every fragment.
    fn on_finish(&mut self, full_text: String);

    fn on_error(&mut self, error: AssistError);
}

/// Adapts three closures into a [`StreamObserver`].
pub struct StreamCallbacks<F, D, E> {
    on_fragment: F,
    on_finish: D,
    on_error: E,
}

impl<F, D, E> StreamCallbacks<F, D, E>
where
    F: FnMut(&str) + Send + 'static,
    D: FnMut(String) + Send + 'static,
    E: FnMut(AssistError) + Send + 'static,
{
    pub fn new(on_fragment: F, on_finish: D, on_error: E) -> Self {
        Self {
            on_fragment,
            on_finish,
            on_error,
        }
    }
}

impl<F, D, E> StreamObserver for StreamCallbacks<F, D, E>
where
    F: FnMut(&str) + Send + 'static,
    D: FnMut(String) + Send + 'static,
    E: FnMut(AssistError) + Send + 'static,
{
    fn on_fragment(&mut self, fragment: &str) {
        (self.on_fragment)(fragment)
    }

    fn on_finish(&mut self, full_text: String) {
        (self.on_finish)(full_text)
    }

    fn on_error(&mut self, error: AssistError) {
        (self.on_error)(error)
    }
}

/// A stream callback tagged with the session that opened the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEvent {
    pub session_id: Uuid,
    pub kind: StreamEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEventKind {
    Fragment(String),
    Finished(String),
    Failed(AssistError),
}

/// Forwards callbacks as [`StreamEvent`]s over an unbounded channel, in
/// arrival order.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    session_id: Uuid,
    tx: UnboundedSender<StreamEvent>,
}

impl ChannelObserver {
    pub fn new(session_id: Uuid, tx: UnboundedSender<StreamEvent>) -> Self {
        Self { session_id, tx }
    }

    fn send(&self, kind: StreamEventKind) {
        let event = StreamEvent {
            session_id: self.session_id,
            kind,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!(
                "[StreamClient] receiver gone, dropping event for session {}",
                self.session_id
            );
        }
    }
}

impl StreamObserver for ChannelObserver {
    fn on_fragment(&mut self, fragment: &str) {
        self.send(StreamEventKind::Fragment(fragment.to_string()));
    }

    fn on_finish(&mut self, full_text: String) {
        self.send(StreamEventKind::Finished(full_text));
    }

    fn on_error(&mut self, error: AssistError) {
        self.send(StreamEventKind::Failed(error));
    }
}
