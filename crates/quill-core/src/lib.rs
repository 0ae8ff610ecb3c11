//! Domain model for Quill's AI edit sessions.
//!
//! This crate holds everything the edit-session subsystem reasons about but
//! nothing that talks to the network or the filesystem: the action catalog,
//! the session record, the collaborator traits the editing surface implements,
//! the configuration model and the content-sync guard.

pub mod action;
pub mod config;
pub mod editor;
pub mod error;
pub mod session;
pub mod sync_guard;

pub use error::{AssistError, QuillError};
