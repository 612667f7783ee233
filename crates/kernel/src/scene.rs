use crate::motion::Motion;
use crate::plane::PlaneRegistry;
use driftgrid_common::{Tuning, Viewport};
use driftgrid_layout::LayoutManifest;
use glam::DVec2;

/// Animation clock advance per played frame.
const TIME_STEP: f64 = 0.05;

/// Result of one tick, handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub frame: u64,
    pub target: DVec2,
    pub current: DVec2,
    pub diff: f64,
    pub time: f64,
}

/// The whole drifting grid: planes plus the smoothed offset that moves them.
#[derive(Debug, Clone)]
pub struct Scene {
    registry: PlaneRegistry,
    motion: Motion,
    tuning: Tuning,
    playing: bool,
    last: FrameState,
}

impl Scene {
    pub fn new(layout: &LayoutManifest, viewport: Viewport) -> Self {
        let tuning = layout.tuning;
        let registry = PlaneRegistry::from_layout(layout, viewport, &tuning);
        tracing::info!(
            "scene created: {} planes, extent {:.0}x{:.0}",
            registry.len(),
            registry.extent().x,
            registry.extent().y
        );
        Self {
            registry,
            motion: Motion::new(&tuning),
            tuning,
            playing: true,
            last: FrameState {
                frame: 0,
                target: DVec2::ZERO,
                current: DVec2::ZERO,
                diff: 0.0,
                time: 0.0,
            },
        }
    }

    /// Advance one frame toward `target`. A paused scene returns the last state.
    pub fn tick(&mut self, target: DVec2) -> FrameState {
        if !self.playing {
            return self.last;
        }
        self.motion.step(target);
        self.registry.reposition(self.motion.current());
        self.last = FrameState {
            frame: self.last.frame + 1,
            target,
            current: self.motion.current(),
            diff: self.motion.diff(),
            time: self.last.time + TIME_STEP,
        };
        self.last
    }

    pub fn resize(&mut self, viewport: Viewport) {
        tracing::debug!("scene viewport {}x{}", viewport.width, viewport.height);
        self.registry.remeasure(viewport);
    }

    pub fn registry(&self) -> &PlaneRegistry {
        &self.registry
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn last_frame(&self) -> FrameState {
        self.last
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }
}
