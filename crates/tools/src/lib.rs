//! Developer tooling: read-only scene inspection for the debug panel and CLI.

pub mod inspector;

pub use inspector::{PlaneInfo, SceneInspector, SceneSummary};
