use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Pixels per wheel line for engines that report line deltas unscaled.
pub const LINE_HEIGHT: f64 = 40.0;
/// Pixels per wheel page.
pub const PAGE_HEIGHT: f64 = 800.0;
/// Base multiplier applied to every wheel delta.
pub const MOUSE_MULTIPLIER: f64 = 0.6;
/// Extra multiplier for line deltas on line-scaled engines.
pub const LINE_SCALED_MULTIPLIER: f64 = 20.0;

/// Unit a wheel delta is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeltaMode {
    Pixel,
    Line,
    Page,
}

/// Host characteristics that change how wheel deltas are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Windows reports roughly half the travel per notch; multipliers double.
    pub windows: bool,
    /// The engine reports coarse line deltas that need the line-scaled multiplier.
    pub line_scaled_engine: bool,
}

impl Platform {
    /// Platform of the running binary. No engine reports line-scaled deltas
    /// natively, so that flag starts false.
    pub fn detect() -> Self {
        Self {
            windows: cfg!(target_os = "windows"),
            line_scaled_engine: false,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

/// Converts wheel deltas into scene pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelNormalizer {
    platform: Platform,
    mouse: f64,
    line_scaled: f64,
}

impl WheelNormalizer {
    pub fn new(platform: Platform) -> Self {
        let factor = if platform.windows { 2.0 } else { 1.0 };
        Self {
            platform,
            mouse: MOUSE_MULTIPLIER * factor,
            line_scaled: LINE_SCALED_MULTIPLIER * factor,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Multiplier applied to a raw delta in `mode`.
    pub fn multiplier(&self, mode: DeltaMode) -> f64 {
        match mode {
            DeltaMode::Pixel => self.mouse,
            DeltaMode::Line if self.platform.line_scaled_engine => self.mouse * self.line_scaled,
            DeltaMode::Line => self.mouse * LINE_HEIGHT,
            DeltaMode::Page => self.mouse * PAGE_HEIGHT,
        }
    }

    /// Normalized pixel delta, or `None` for a malformed (non-finite) event.
    pub fn normalize(&self, delta_x: f64, delta_y: f64, mode: DeltaMode) -> Option<DVec2> {
        if !delta_x.is_finite() || !delta_y.is_finite() {
            return None;
        }
        Some(DVec2::new(delta_x, delta_y) * self.multiplier(mode))
    }
}

impl Default for WheelNormalizer {
    fn default() -> Self {
        Self::new(Platform::detect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(windows: bool, line_scaled_engine: bool) -> Platform {
        Platform {
            windows,
            line_scaled_engine,
        }
    }

    #[test]
    fn multiplier_table() {
        let cases = [
            (false, false, DeltaMode::Pixel, 0.6),
            (true, false, DeltaMode::Pixel, 1.2),
            (false, true, DeltaMode::Pixel, 0.6),
            (false, true, DeltaMode::Line, 12.0),
            (true, true, DeltaMode::Line, 48.0),
            (false, false, DeltaMode::Line, 24.0),
            (true, false, DeltaMode::Line, 48.0),
            (false, false, DeltaMode::Page, 480.0),
        ];
        for (windows, engine, mode, expected) in cases {
            let m = WheelNormalizer::new(platform(windows, engine)).multiplier(mode);
            assert!(
                (m - expected).abs() < 1e-9,
                "windows={windows} engine={engine} {mode:?}: {m} != {expected}"
            );
        }
    }

    #[test]
    fn multiplier_is_deterministic() {
        let a = WheelNormalizer::new(platform(true, true));
        let b = WheelNormalizer::new(platform(true, true));
        for mode in [DeltaMode::Pixel, DeltaMode::Line, DeltaMode::Page] {
            assert_eq!(a.multiplier(mode), b.multiplier(mode));
        }
    }

    #[test]
    fn normalize_scales_both_axes() {
        let w = WheelNormalizer::new(platform(false, false));
        let d = w.normalize(10.0, -5.0, DeltaMode::Pixel).unwrap();
        assert!((d.x - 6.0).abs() < 1e-9);
        assert!((d.y + 3.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_delta_ignored() {
        let w = WheelNormalizer::new(platform(false, false));
        assert!(w.normalize(f64::NAN, 1.0, DeltaMode::Pixel).is_none());
        assert!(w.normalize(0.0, f64::INFINITY, DeltaMode::Line).is_none());
    }
}
