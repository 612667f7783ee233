use driftgrid_common::Tuning;
use glam::DVec2;

/// Exponentially smoothed scroll offset.
///
/// Each step closes a fixed fraction of the gap to the target, with the time
/// step fixed at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    current: DVec2,
    diff: f64,
    ease: f64,
    quantum: f64,
    diff_scale: f64,
}

impl Motion {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            current: DVec2::ZERO,
            diff: 0.0,
            ease: tuning.ease,
            quantum: 10f64.powi(tuning.precision.min(Tuning::MAX_PRECISION) as i32),
            diff_scale: tuning.diff_scale,
        }
    }

    /// Smoothed offset.
    pub fn current(&self) -> DVec2 {
        self.current
    }

    /// Velocity scalar from the last step, fed to the shader.
    pub fn diff(&self) -> f64 {
        self.diff
    }

    /// Advance one frame toward `target`.
    pub fn step(&mut self, target: DVec2) {
        let gap = target - self.current;
        let next = self.current + gap * self.ease;
        self.current = DVec2::new(self.round(next.x), self.round(next.y));
        self.diff = (gap.x * self.diff_scale)
            .abs()
            .max((gap.y * self.diff_scale).abs());
    }

    fn round(&self, v: f64) -> f64 {
        (v * self.quantum).round() / self.quantum
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_closes_ease_fraction() {
        let mut m = Motion::default();
        m.step(DVec2::new(100.0, 0.0));
        assert_eq!(m.current(), DVec2::new(8.5, 0.0));
    }

    #[test]
    fn converges_geometrically() {
        let mut m = Motion::default();
        let target = DVec2::new(100.0, -100.0);
        for _ in 0..50 {
            m.step(target);
        }
        // 100 * 0.915^50 ~= 1.18
        assert!((m.current().x - 100.0).abs() < 1.5, "{:?}", m.current());
        for _ in 0..15 {
            m.step(target);
        }
        assert!((m.current().x - 100.0).abs() < 0.5, "{:?}", m.current());
        assert!((m.current().y + 100.0).abs() < 0.5, "{:?}", m.current());
    }

    #[test]
    fn eventually_settles_on_target() {
        let mut m = Motion::default();
        let target = DVec2::new(1234.56, -78.9);
        for _ in 0..400 {
            m.step(target);
        }
        assert!((m.current() - target).abs().max_element() <= 0.06);
    }

    #[test]
    fn rounds_to_two_decimals() {
        let mut m = Motion::default();
        m.step(DVec2::new(1.0, 1.0));
        // 0.085 rounds to 0.09
        assert_eq!(m.current(), DVec2::new(0.09, 0.09));
    }

    #[test]
    fn oversized_precision_stays_finite() {
        let tuning = Tuning {
            precision: 400,
            ..Tuning::default()
        };
        let mut m = Motion::new(&tuning);
        m.step(DVec2::new(100.0, 0.0));
        assert!(m.current().is_finite());
        assert_eq!(m.current(), DVec2::new(8.5, 0.0));
    }

    #[test]
    fn diff_uses_larger_gap() {
        let mut m = Motion::default();
        m.step(DVec2::new(100.0, -3000.0));
        assert!((m.diff() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn diff_decays_at_rest() {
        let mut m = Motion::default();
        m.step(DVec2::new(500.0, 0.0));
        let first = m.diff();
        for _ in 0..200 {
            m.step(DVec2::new(500.0, 0.0));
        }
        assert!(m.diff() < first);
        assert!(m.diff() < 1e-5);
    }
}
