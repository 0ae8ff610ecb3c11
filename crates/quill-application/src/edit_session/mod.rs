//! AI edit sessions.
//!
//! - `controller`: the state machine (`EditSessionController`)
//! - `resolution`: what a finished session hands back (`Resolution`, `Preview`)

mod controller;
mod resolution;

pub use controller::EditSessionController;
pub use resolution::{Preview, Resolution, ResolutionKind};
