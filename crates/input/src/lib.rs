//! Input normalization: raw pointer and wheel events become a single target
//! scroll offset.
//!
//! # Invariants
//! - The scene consumes only the target offset, never raw window events.
//! - Wheel multipliers are a pure function of platform flags and delta mode.

pub mod action;
pub mod normalizer;
pub mod wheel;

pub use action::Action;
pub use normalizer::InputNormalizer;
pub use wheel::{DeltaMode, Platform, WheelNormalizer};
