//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read scene state; they never move planes.
//! - Render output derives only from the scene and the view.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
