use quill_core::editor::Coordinates;
use serde::Serialize;
use strum::Display;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionKind {
    /// Generated text committed by the user.
    Accepted,
    /// Generated text thrown away, original restored.
    Discarded,
    /// Stopped by the user.
    Cancelled,
    /// A live session reached the end of its stream.
    Completed,
    /// Ended by an error, original restored.
    Failed,
}

/// Result of resolving a session: the serialized document afterwards, to be
/// propagated to whoever owns the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub kind: ResolutionKind,
    pub content: String,
}

/// Ghost preview of a buffered session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub text: String,
    pub position: usize,
    pub coords: Coordinates,
    /// Still receiving fragments.
    pub streaming: bool,
}
