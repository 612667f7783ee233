use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Index of a plane in the registry. Stable for the lifetime of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaneId(pub u32);

impl std::fmt::Display for PlaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Axis-aligned rectangle in layout space (y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Bottom-right corner.
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.right(), self.bottom())
    }

    /// True when `other` lies fully inside this rectangle (edges inclusive).
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Size of the visible drawing area in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height.max(1.0)
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Numeric constants of the drift effect.
///
/// Every field has a default, so a manifest may override any subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fraction of the remaining gap closed per frame.
    pub ease: f64,
    /// Decimal places the smoothed offset is rounded to each frame.
    pub precision: u32,
    /// Scale from per-frame gap to the shader distortion value.
    pub diff_scale: f64,
    /// Scene units per logical pixel of pointer travel while dragging.
    pub drag_scale: f64,
    /// Parallax weight lost per step within a period.
    pub weight_step: f64,
    /// Number of planes after which parallax weights repeat.
    pub weight_period: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ease: 0.085,
            precision: 2,
            diff_scale: 0.0001,
            drag_scale: 2.5,
            weight_step: 0.1,
            weight_period: 5,
        }
    }
}

impl Tuning {
    /// Largest rounding precision whose scale factor stays exact in `f64`.
    pub const MAX_PRECISION: u32 = 15;

    /// Parallax weight of the plane at `index`: `1 - (index % period) * step`.
    pub fn parallax_weight(&self, index: usize) -> f64 {
        let period = self.weight_period.max(1) as usize;
        1.0 - (index % period) as f64 * self.weight_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center(), DVec2::new(60.0, 45.0));
        assert_eq!(r.max(), DVec2::new(110.0, 70.0));
    }

    #[test]
    fn rect_contains_and_union() {
        let outer = Rect::new(0.0, 0.0, 200.0, 200.0);
        let inner = Rect::new(10.0, 10.0, 50.0, 50.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));

        let other = Rect::new(150.0, 180.0, 100.0, 100.0);
        let u = outer.union(&other);
        assert_eq!(u, Rect::new(0.0, 0.0, 250.0, 280.0));
    }

    #[test]
    fn viewport_aspect_never_divides_by_zero() {
        let v = Viewport::new(800.0, 0.0);
        assert!(v.aspect().is_finite());
        assert_eq!(Viewport::new(1600.0, 800.0).aspect(), 2.0);
    }

    #[test]
    fn parallax_weights_cycle() {
        let t = Tuning::default();
        let weights: Vec<f64> = (0..7).map(|i| t.parallax_weight(i)).collect();
        let expected = [1.0, 0.9, 0.8, 0.7, 0.6, 1.0, 0.9];
        for (w, e) in weights.iter().zip(expected) {
            assert!((w - e).abs() < 1e-12, "{w} != {e}");
        }
    }

    #[test]
    fn tuning_zero_period_does_not_panic() {
        let t = Tuning {
            weight_period: 0,
            ..Tuning::default()
        };
        assert_eq!(t.parallax_weight(3), 1.0);
    }

    #[test]
    fn plane_id_display() {
        assert_eq!(PlaneId(7).to_string(), "#7");
    }
}
