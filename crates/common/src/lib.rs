//! Shared types for the driftgrid workspace.
//!
//! Layout space follows screen conventions: origin at the top-left of the
//! container, x to the right, y down, units are logical pixels.

pub mod types;

pub use types::{PlaneId, Rect, Tuning, Viewport};
