//! Action domain models.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::AssistError;

/// A semantic AI action on the note.
///
/// `Custom` carries the user's free-text instruction, `Template` carries a
/// template identifier such as `"meeting"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "param", rename_all = "snake_case")]
pub enum Action {
    Refine,
    Summarize,
    Translate,
    Continue,
    Custom(String),
    Template(String),
}

/// Payload-free tag of an [`Action`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Refine,
    Summarize,
    Translate,
    Continue,
    Custom,
    Template,
}

/// Where an action takes its input text from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputScope {
    /// The current selection; it is removed from the document while the
    /// session runs and replaced by the generated text.
    Selection,
    /// Everything before the cursor; generated text is appended at the cursor.
    PrecedingText,
    /// The selection when there is one, otherwise nothing (additive).
    SelectionOrNone,
    /// No document text at all (additive).
    None,
}

/// Templates the catalog knows how to generate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TemplateKind {
    Meeting,
    Brainstorm,
    Code,
}

impl TemplateKind {
    /// Parses a template identifier, rejecting anything unrecognised.
    pub fn parse(id: &str) -> Result<Self, AssistError> {
        Self::from_str(id.trim()).map_err(|_| AssistError::UnknownTemplate(id.to_string()))
    }

    /// Human-readable title used when framing the request.
    pub fn title(&self) -> &'static str {
        match self {
            TemplateKind::Meeting => "meeting notes",
            TemplateKind::Brainstorm => "brainstorming session",
            TemplateKind::Code => "code snippet documentation",
        }
    }
}

impl Action {
    /// Returns the payload-free kind of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Refine => ActionKind::Refine,
            Action::Summarize => ActionKind::Summarize,
            Action::Translate => ActionKind::Translate,
            Action::Continue => ActionKind::Continue,
            Action::Custom(_) => ActionKind::Custom,
            Action::Template(_) => ActionKind::Template,
        }
    }

    /// Returns where this action reads its input from.
    pub fn input_scope(&self) -> InputScope {
        match self {
            Action::Refine | Action::Summarize | Action::Translate => InputScope::Selection,
            Action::Continue => InputScope::PrecedingText,
            Action::Custom(_) => InputScope::SelectionOrNone,
            Action::Template(_) => InputScope::None,
        }
    }

    /// The user-supplied instruction, for `Custom` only.
    pub fn custom_prompt(&self) -> Option<&str> {
        match self {
            Action::Custom(prompt) => Some(prompt.as_str()),
            _ => None,
        }
    }
}
