//! Edit-session domain module.
//!
//! - `phase`: lifecycle phases and preview policies (`Phase`, `PreviewPolicy`)
//! - `model`: the per-session record (`SessionState`, `Anchor`)

mod model;
mod phase;

pub use model::{Anchor, SessionState};
pub use phase::{Phase, PreviewPolicy};
