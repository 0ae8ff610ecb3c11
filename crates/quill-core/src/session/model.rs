//! The per-session record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::phase::{Phase, PreviewPolicy};
use crate::action::Action;
use crate::editor::Coordinates;

/// Where the session's output lands in the document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Anchor {
    /// Character offset of the insertion point.
    pub position: usize,
    /// Screen position of `position` when the session started.
    pub coords: Coordinates,
}

/// State of one AI edit session.
///
/// Fields are private: `generated_text` only grows through
/// [`SessionState::append_fragment`] and only while streaming, and the
/// anchor is set once by [`SessionState::latch`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    id: Uuid,
    phase: Phase,
    action: Option<Action>,
    policy: PreviewPolicy,
    original_text: String,
    generated_text: String,
    anchor: Option<Anchor>,
    custom_prompt: Option<String>,
    started_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SessionState {
    /// A fresh record with no session.
    pub fn idle() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Idle,
            action: None,
            policy: PreviewPolicy::default(),
            original_text: String::new(),
            generated_text: String::new(),
            anchor: None,
            custom_prompt: None,
            started_at: None,
        }
    }

    /// Starts capturing input for a new session.
    pub fn begin(action: Action, policy: PreviewPolicy) -> Self {
        let custom_prompt = action.custom_prompt().map(str::to_string);
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Capturing,
            action: Some(action),
            policy,
            original_text: String::new(),
            generated_text: String::new(),
            anchor: None,
            custom_prompt,
            started_at: Some(Utc::now()),
        }
    }

    /// Records the removed text and the anchor, then enters `Streaming`.
    ///
    /// Returns `false` (and changes nothing) outside `Capturing`.
    pub fn latch(&mut self, anchor: Anchor, original_text: String) -> bool {
        if self.phase != Phase::Capturing {
            return false;
        }
        self.anchor = Some(anchor);
        self.original_text = original_text;
        self.phase = Phase::Streaming;
        true
    }

    /// Appends a fragment. Ignored outside `Streaming`.
    pub fn append_fragment(&mut self, fragment: &str) -> bool {
        if self.phase != Phase::Streaming {
            return false;
        }
        self.generated_text.push_str(fragment);
        true
    }

    /// Freezes the generated text and enters `Reviewing`.
    pub fn freeze(&mut self) -> bool {
        if self.phase != Phase::Streaming {
            return false;
        }
        self.phase = Phase::Reviewing;
        true
    }

    /// Enters `Resolving`. Allowed from any non-idle phase.
    pub fn begin_resolving(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return false;
        }
        self.phase = Phase::Resolving;
        true
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    pub fn policy(&self) -> PreviewPolicy {
        self.policy
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn generated_text(&self) -> &str {
        &self.generated_text
    }

    /// Length of the generated text in characters.
    pub fn generated_chars(&self) -> usize {
        self.generated_text.chars().count()
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    pub fn custom_prompt(&self) -> Option<&str> {
        self.custom_prompt.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}
