use crate::action::Action;
use crate::wheel::WheelNormalizer;
use driftgrid_common::Tuning;
use glam::DVec2;

/// Owns the target offset and folds actions into it.
///
/// Scene space is y up, so dragging down lowers the target and a positive
/// (downward) wheel delta raises it.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    target: DVec2,
    dragging: bool,
    /// Target minus scaled cursor position, captured on pointer-down.
    origin: DVec2,
    drag_scale: f64,
    wheel: WheelNormalizer,
}

impl InputNormalizer {
    pub fn new(wheel: WheelNormalizer, tuning: &Tuning) -> Self {
        Self {
            target: DVec2::ZERO,
            dragging: false,
            origin: DVec2::ZERO,
            drag_scale: tuning.drag_scale,
            wheel,
        }
    }

    pub fn target(&self) -> DVec2 {
        self.target
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn wheel(&self) -> &WheelNormalizer {
        &self.wheel
    }

    /// Apply one action. Returns true if the target offset changed.
    pub fn apply(&mut self, action: &Action) -> bool {
        let before = self.target;
        match *action {
            Action::PointerDown { x, y } => {
                if self.dragging {
                    return false;
                }
                self.dragging = true;
                self.origin = DVec2::new(
                    self.target.x - x * self.drag_scale,
                    self.target.y + y * self.drag_scale,
                );
            }
            Action::PointerMove { x, y } => {
                if !self.dragging {
                    return false;
                }
                self.target = DVec2::new(
                    self.origin.x + x * self.drag_scale,
                    self.origin.y - y * self.drag_scale,
                );
            }
            Action::PointerUp => {
                self.dragging = false;
            }
            Action::Wheel {
                delta_x,
                delta_y,
                mode,
            } => {
                let Some(pixels) = self.wheel.normalize(delta_x, delta_y, mode) else {
                    tracing::debug!("ignoring malformed wheel delta ({delta_x}, {delta_y})");
                    return false;
                };
                self.target.x -= pixels.x;
                self.target.y += pixels.y;
            }
            Action::TogglePlayback | Action::Noop => {}
        }
        self.target != before
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new(WheelNormalizer::default(), &Tuning::default())
    }
}
