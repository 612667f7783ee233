use crate::wrap::wrap;
use driftgrid_common::{PlaneId, Rect, Tuning, Viewport};
use driftgrid_layout::LayoutManifest;
use glam::DVec2;
use std::path::PathBuf;

/// One grid image: its measured rectangle and live scene position.
///
/// GPU resources for the plane live in the render backend, keyed by `id`.
#[derive(Debug, Clone)]
pub struct Plane {
    pub id: PlaneId,
    /// Resolved image path.
    pub src: PathBuf,
    pub rect: Rect,
    /// Vertical drift multiplier.
    pub weight: f64,
    /// Distance from the viewport center to the rect center, in layout space.
    pub offset: DVec2,
    /// Wrapped scroll coordinate before centering, per axis.
    pub wrapped: DVec2,
    /// Scene position (y up, origin at viewport center).
    pub position: DVec2,
}

impl Plane {
    /// Wrap range `[lo, hi)` of this plane for a grid extent.
    pub fn wrap_bounds(&self, extent: DVec2) -> (DVec2, DVec2) {
        let hi = self.rect.max();
        (-(extent - hi), hi)
    }

    fn centering_offset(rect: &Rect, viewport: Viewport) -> DVec2 {
        rect.center() - viewport.center()
    }
}

/// All planes of a scene, in layout order.
#[derive(Debug, Clone)]
pub struct PlaneRegistry {
    planes: Vec<Plane>,
    extent: DVec2,
    viewport: Viewport,
}

impl PlaneRegistry {
    /// Build one plane per layout cell, measured against `viewport`.
    pub fn from_layout(layout: &LayoutManifest, viewport: Viewport, tuning: &Tuning) -> Self {
        let planes = layout
            .planes
            .iter()
            .enumerate()
            .map(|(i, spec)| Plane {
                id: PlaneId(i as u32),
                src: layout.resolve_src(&spec.src),
                rect: spec.rect,
                weight: tuning.parallax_weight(i),
                offset: Plane::centering_offset(&spec.rect, viewport),
                wrapped: DVec2::ZERO,
                position: DVec2::ZERO,
            })
            .collect();
        let mut registry = Self {
            planes,
            extent: layout.container.max(),
            viewport,
        };
        registry.reposition(DVec2::ZERO);
        registry
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn get(&self, id: PlaneId) -> Option<&Plane> {
        self.planes.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Grid extent: bottom-right corner of the container.
    pub fn extent(&self) -> DVec2 {
        self.extent
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Recompute centering offsets for a new viewport size.
    pub fn remeasure(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for plane in &mut self.planes {
            let old = plane.offset;
            plane.offset = Plane::centering_offset(&plane.rect, viewport);
            plane.position += old - plane.offset;
        }
    }

    /// Place every plane for the smoothed global offset.
    pub fn reposition(&mut self, offset: DVec2) {
        let extent = self.extent;
        for plane in &mut self.planes {
            let (lo, hi) = plane.wrap_bounds(extent);
            plane.wrapped = DVec2::new(
                wrap(lo.x, hi.x, offset.x),
                wrap(lo.y, hi.y, offset.y * plane.weight),
            );
            plane.position = plane.wrapped - plane.offset;
        }
    }
}
