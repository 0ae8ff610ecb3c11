//! Session lifecycle types.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// No session. The only phase in which external content updates apply.
    #[default]
    Idle,
    /// Input text and anchor are being taken from the document.
    Capturing,
    /// A stream is open and fragments are arriving.
    Streaming,
    /// Generation finished; waiting for accept or discard.
    Reviewing,
    /// A resolution is mutating the document.
    Resolving,
}

impl Phase {
    /// Accept, discard and cancel are meaningful in these phases.
    pub fn is_resolvable(&self) -> bool {
        matches!(self, Phase::Streaming | Phase::Reviewing)
    }
}

/// How generated text reaches the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PreviewPolicy {
    /// Fragments accumulate in a ghost preview; the document is only touched
    /// when the user accepts.
    #[default]
    Buffered,
    /// Fragments are inserted into the document as they arrive.
    Live,
}
