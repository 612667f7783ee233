use glam::{Mat4, Vec3};

/// Orthographic camera looking down -Z at the plane grid.
///
/// The frustum is `frustum_size` tall and `frustum_size * aspect` wide.
pub struct OrthoCamera {
    pub frustum_size: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(1280.0, 1280.0 / 720.0)
    }
}

impl OrthoCamera {
    pub fn new(frustum_size: f32, aspect: f32) -> Self {
        Self {
            frustum_size,
            aspect,
            near: -1000.0,
            far: 1000.0,
            eye: Vec3::new(0.0, 0.0, 2.0),
        }
    }

    /// Debug panel range for the frustum size: half to twice the viewport width.
    pub fn frustum_range(viewport_width: f32) -> std::ops::RangeInclusive<f32> {
        viewport_width / 2.0..=viewport_width * 2.0
    }

    /// `(left, right, bottom, top)` of the frustum.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let half_h = self.frustum_size / 2.0;
        let half_w = self.frustum_size * self.aspect / 2.0;
        (-half_w, half_w, -half_h, half_h)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let (left, right, bottom, top) = self.bounds();
        Mat4::orthographic_rh(left, right, bottom, top, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
