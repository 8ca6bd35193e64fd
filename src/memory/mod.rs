//! Memory management
//!
//! A linear allocator made to keep entity components out of the general
//! heap. Payloads are plain-old-data, so resetting an arena never needs to
//! run destructors.

pub mod arena;

pub use arena::{Arena, ArenaRef, ArenaSlice};
