//! Trigger surfaces: the menus that start edit sessions.
//!
//! All three surfaces offer the same action set; they differ only in how
//! the result is previewed.

use quill_core::action::{Action, ActionKind};
use quill_core::session::PreviewPolicy;
use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerSurface {
    /// Right-click menu on a selection.
    ContextMenu,
    /// Menu opened by typing `/`.
    SlashMenu,
    /// Floating toolbar shown over a selection.
    SelectionToolbar,
}

impl TriggerSurface {
    pub fn default_policy(&self) -> PreviewPolicy {
        match self {
            TriggerSurface::SelectionToolbar => PreviewPolicy::Live,
            TriggerSurface::ContextMenu | TriggerSurface::SlashMenu => PreviewPolicy::Buffered,
        }
    }

    /// Menu entries, identical for every surface.
    pub fn entries(&self) -> Vec<MenuEntry> {
        ActionKind::iter().map(MenuEntry::for_kind).collect()
    }
}

/// One item of a trigger menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub kind: ActionKind,
    pub label: &'static str,
    /// Slash command that selects this entry.
    pub command: String,
    /// The entry asks for an argument (instruction or template id).
    pub takes_argument: bool,
}

impl MenuEntry {
    fn for_kind(kind: ActionKind) -> Self {
        let label = match kind {
            ActionKind::Refine => "Refine writing",
            ActionKind::Summarize => "Summarize",
            ActionKind::Translate => "Translate",
            ActionKind::Continue => "Continue writing",
            ActionKind::Custom => "Ask AI...",
            ActionKind::Template => "Insert template",
        };
        Self {
            kind,
            label,
            command: format!("/{kind}"),
            takes_argument: matches!(kind, ActionKind::Custom | ActionKind::Template),
        }
    }
}

/// Parses slash-menu input such as `/summarize`, `/custom make it formal`
/// or `/template meeting`. Returns `None` for anything that is not a known
/// command.
///
/// Arguments are not validated here: a blank instruction or an unknown
/// template id is rejected when the session starts.
pub fn parse_slash_command(input: &str) -> Option<Action> {
    let body = input.trim().strip_prefix('/')?;
    let (name, argument) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let kind = ActionKind::from_str(&name.to_ascii_lowercase()).ok()?;
    let action = match kind {
        ActionKind::Refine => Action::Refine,
        ActionKind::Summarize => Action::Summarize,
        ActionKind::Translate => Action::Translate,
        ActionKind::Continue => Action::Continue,
        ActionKind::Custom => Action::Custom(argument.to_string()),
        ActionKind::Template => Action::Template(argument.to_string()),
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_previews_live() {
        assert_eq!(
            TriggerSurface::SelectionToolbar.default_policy(),
            PreviewPolicy::Live
        );
        assert_eq!(
            TriggerSurface::ContextMenu.default_policy(),
            PreviewPolicy::Buffered
        );
        assert_eq!(TriggerSurface::SlashMenu.default_policy(), PreviewPolicy::Buffered);
    }

    #[test]
    fn every_surface_offers_the_same_actions() {
        let reference = TriggerSurface::ContextMenu.entries();
        assert_eq!(reference.len(), 6);
        for surface in TriggerSurface::iter() {
            assert_eq!(surface.entries(), reference);
        }
        assert_eq!(reference[1].command, "/summarize");
    }

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse_slash_command("/refine"), Some(Action::Refine));
        assert_eq!(parse_slash_command("  /Continue "), Some(Action::Continue));
    }

    #[test]
    fn parses_command_arguments() {
        assert_eq!(
            parse_slash_command("/custom  make it formal "),
            Some(Action::Custom("make it formal".into()))
        );
        assert_eq!(
            parse_slash_command("/template meeting"),
            Some(Action::Template("meeting".into()))
        );
    }

    #[test]
    fn rejects_unknown_or_unprefixed_input() {
        assert_eq!(parse_slash_command("/poem"), None);
        assert_eq!(parse_slash_command("refine"), None);
        assert_eq!(parse_slash_command("/"), None);
    }
}
