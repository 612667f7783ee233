use crate::wheel::DeltaMode;

/// A device event translated out of the windowing layer.
///
/// Positions are logical pixels with y down. Wheel deltas use the browser
/// convention: positive `delta_y` scrolls down, positive `delta_x` scrolls right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Primary button pressed at a cursor position.
    PointerDown { x: f64, y: f64 },
    /// Cursor moved to a position.
    PointerMove { x: f64, y: f64 },
    /// Primary button released.
    PointerUp,
    /// Wheel or touchpad scroll.
    Wheel {
        delta_x: f64,
        delta_y: f64,
        mode: DeltaMode,
    },
    /// Pause or resume the animation.
    TogglePlayback,
    /// No-op (used for events that have no mapping).
    Noop,
}

impl Action {
    /// True for actions that can move the target offset.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Action::PointerDown { .. }
                | Action::PointerMove { .. }
                | Action::PointerUp
                | Action::Wheel { .. }
        )
    }
}
