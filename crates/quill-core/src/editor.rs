//! Collaborator interfaces consumed by the edit-session core.
//!
//! The rich-text surface, the settings store and the toast layer live outside
//! this workspace; the core only sees them through these traits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiSettings;

/// A selection in document positions. `from == to` is a collapsed cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    pub fn cursor(position: usize) -> Self {
        Self::new(position, position)
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// On-screen coordinates of a document position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// The capabilities the core needs from the rich-text editing surface.
///
/// Positions count characters (Unicode scalar values) from the start of the
/// document.
pub trait EditingSurface {
    /// Current selection.
    fn selection(&self) -> Selection;

    /// Moves the selection.
    fn select(&mut self, selection: Selection);

    /// Text between two positions.
    fn text(&self, from: usize, to: usize) -> String;

    /// Serialized document content.
    fn content(&self) -> String;

    /// Replaces the whole document (used by the external content sync).
    fn set_content(&mut self, content: &str);

    /// Removes the text between two positions.
    fn delete_range(&mut self, from: usize, to: usize);

    /// Inserts text at a position.
    fn insert_at(&mut self, position: usize, text: &str);

    /// Screen anchor for a position, used to place the preview overlay.
    fn coordinates_of(&self, position: usize) -> Coordinates;

    fn is_editable(&self) -> bool;

    fn set_editable(&mut self, editable: bool);
}

/// Source of the AI endpoint settings.
pub trait ConfigProvider: Send + Sync {
    /// Returns the current settings. Missing values are left empty; the
    /// stream client decides whether they are usable.
    fn get(&self) -> AiSettings;
}

/// Sink for transient, auto-dismissing notices.
pub trait NotificationSink: Send + Sync {
    fn show(&self, message: &str, duration: Duration);
}
