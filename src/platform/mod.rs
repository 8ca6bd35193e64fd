//! Platform abstraction layer
//!
//! Window, keyboard and timing live outside the core. This module only
//! defines what the core consumes from them each frame.

pub mod input;

pub use input::{Action, ActionSet, TickInput};
