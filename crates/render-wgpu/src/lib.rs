//! wgpu render backend for the drifting grid.
//!
//! Draws each plane as a textured unit quad through an orthographic camera.
//! Images decode on background threads and upload when ready; until then a
//! plane samples a blank texture.
//!
//! # Invariants
//! - Renderer never moves planes; positions come from the scene.
//! - One draw call per plane per frame.
//! - A failed image load leaves the plane blank and is only logged.

mod camera;
mod gpu;
mod shaders;
mod texture;

pub use camera::OrthoCamera;
pub use gpu::PlaneRenderer;
pub use texture::{DecodedImage, TextureLoader};
