use driftgrid_common::Viewport;
use driftgrid_kernel::Scene;
use std::fmt::Write;

/// Orthographic view configuration shared by all renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub viewport: Viewport,
    /// Vertical extent of the orthographic frustum in scene units.
    pub frustum_size: f64,
}

impl RenderView {
    /// Default view: frustum as tall as the viewport is wide.
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            frustum_size: viewport.width,
        }
    }
}

impl Default for RenderView {
    fn default() -> Self {
        Self::for_viewport(Viewport::default())
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene from the given view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene, used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let frame = scene.last_frame();
        let registry = scene.registry();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (frame={}, planes={}) ===",
            frame.frame,
            registry.len()
        );
        let _ = writeln!(
            out,
            "Offset: current=({:.2}, {:.2}) target=({:.2}, {:.2}) diff={:.5}",
            frame.current.x, frame.current.y, frame.target.x, frame.target.y, frame.diff
        );
        let _ = writeln!(
            out,
            "View: {:.0}x{:.0} frustum={:.0} extent=({:.0}, {:.0})",
            view.viewport.width,
            view.viewport.height,
            view.frustum_size,
            registry.extent().x,
            registry.extent().y
        );

        for plane in registry.planes() {
            let _ = writeln!(
                out,
                "  [{}] pos=({:.2}, {:.2}) weight={:.1} src={}",
                plane.id,
                plane.position.x,
                plane.position.y,
                plane.weight,
                plane.src.display()
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftgrid_layout::{GridSpec, LayoutManifest};
    use glam::DVec2;

    fn scene(count: usize) -> Scene {
        let sources = (0..count).map(|i| format!("{i}.png")).collect();
        let layout = LayoutManifest::from_grid(&GridSpec::default(), sources);
        Scene::new(&layout, Viewport::new(1280.0, 720.0))
    }

    #[test]
    fn debug_renderer_fresh_scene() {
        let output = DebugTextRenderer::new().render(&scene(3), &RenderView::default());
        assert!(output.contains("frame=0"));
        assert!(output.contains("planes=3"));
        assert_eq!(output.matches("pos=").count(), 3);
    }

    #[test]
    fn debug_renderer_after_ticks() {
        let mut s = scene(2);
        s.tick(DVec2::new(100.0, 0.0));
        let output = DebugTextRenderer::new().render(&s, &RenderView::default());
        assert!(output.contains("frame=1"));
        assert!(output.contains("current=(8.50, 0.00)"));
        assert!(output.contains("[#1]"));
    }

    #[test]
    fn render_view_default_frustum_matches_width() {
        let view = RenderView::for_viewport(Viewport::new(1000.0, 500.0));
        assert_eq!(view.frustum_size, 1000.0);
    }
}
