//! AI actions and the catalog that turns them into model requests.
//!
//! Actions are what the trigger surfaces (context menu, slash menu,
//! selection toolbar) hand to the edit-session controller.

mod catalog;
mod model;

pub use catalog::{ActionCatalog, ChatRequest, CUSTOM_SEPARATOR};
pub use model::{Action, ActionKind, InputScope, TemplateKind};
