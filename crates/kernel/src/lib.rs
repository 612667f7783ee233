//! Scene kernel: motion smoothing, plane registry, wrap-around positioning.
//!
//! # Invariants
//! - A tick is a pure function of the previous state and the target offset.
//! - After every tick each plane's wrapped coordinate lies within one period
//!   of the grid extent.
//! - All mutation happens on the caller's thread; nothing here is shared.

pub mod motion;
pub mod plane;
pub mod scene;
pub mod wrap;

pub use motion::Motion;
pub use plane::{Plane, PlaneRegistry};
pub use scene::{FrameState, Scene};
pub use wrap::wrap;
