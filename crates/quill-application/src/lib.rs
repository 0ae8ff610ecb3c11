//! Application layer for Quill's AI assistant.
//!
//! [`EditSessionController`] runs one AI edit session at a time against an
//! [`EditingSurface`](quill_core::editor::EditingSurface); the trigger
//! surfaces feed it actions and [`AssistantBootstrap`] wires it to the real
//! transport and configuration.

pub mod bootstrap;
pub mod edit_session;
pub mod trigger;

pub use bootstrap::AssistantBootstrap;
pub use edit_session::{EditSessionController, Preview, Resolution, ResolutionKind};
pub use trigger::{MenuEntry, TriggerSurface, parse_slash_command};
