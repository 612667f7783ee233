use driftgrid_common::{PlaneId, Rect};
use driftgrid_kernel::Scene;

/// Scene inspector for developer tooling.
///
/// Provides read-only queries against the scene for the debug panel and CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let frame = scene.last_frame();
        let extent = scene.registry().extent();
        SceneSummary {
            frame: frame.frame,
            plane_count: scene.registry().len(),
            current: [frame.current.x, frame.current.y],
            target: [frame.target.x, frame.target.y],
            diff: frame.diff,
            extent: [extent.x, extent.y],
            playing: scene.is_playing(),
        }
    }

    /// Details of one plane.
    pub fn inspect_plane(scene: &Scene, id: PlaneId) -> Option<PlaneInfo> {
        scene.registry().get(id).map(|plane| PlaneInfo {
            id,
            src: plane.src.display().to_string(),
            rect: plane.rect,
            weight: plane.weight,
            position: [plane.position.x, plane.position.y],
        })
    }

    /// Every plane, in layout order.
    pub fn list_planes(scene: &Scene) -> Vec<PlaneInfo> {
        scene
            .registry()
            .planes()
            .iter()
            .filter_map(|p| Self::inspect_plane(scene, p.id))
            .collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub frame: u64,
    pub plane_count: usize,
    pub current: [f64; 2],
    pub target: [f64; 2],
    pub diff: f64,
    pub extent: [f64; 2],
    pub playing: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} planes={} offset=({:.2}, {:.2}) diff={:.5} extent=({:.0}, {:.0}){}",
            self.frame,
            self.plane_count,
            self.current[0],
            self.current[1],
            self.diff,
            self.extent[0],
            self.extent[1],
            if self.playing { "" } else { " [paused]" },
        )
    }
}

/// Detailed info about a single plane.
#[derive(Debug, Clone)]
pub struct PlaneInfo {
    pub id: PlaneId,
    pub src: String,
    pub rect: Rect,
    pub weight: f64,
    pub position: [f64; 2],
}

impl std::fmt::Display for PlaneInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Plane {} rect=({:.0}, {:.0}, {:.0}x{:.0}) weight={:.1} pos=({:.2}, {:.2}) {}",
            self.id,
            self.rect.left,
            self.rect.top,
            self.rect.width,
            self.rect.height,
            self.weight,
            self.position[0],
            self.position[1],
            self.src,
        )
    }
}
