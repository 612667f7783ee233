use driftgrid_common::Rect;
use serde::{Deserialize, Serialize};

/// Regular grid placement for a list of images.
///
/// Cells are filled row-major. The container is the bounding box of all
/// cells grown by `padding` on every side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub columns: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
    pub padding: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            columns: 5,
            cell_width: 320.0,
            cell_height: 420.0,
            gap: 40.0,
            padding: 40.0,
        }
    }
}

impl GridSpec {
    /// Rectangle of the cell at `index`.
    pub fn cell_rect(&self, index: usize) -> Rect {
        let columns = self.columns.max(1) as usize;
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        Rect::new(
            self.padding + col * (self.cell_width + self.gap),
            self.padding + row * (self.cell_height + self.gap),
            self.cell_width,
            self.cell_height,
        )
    }

    /// Container rectangle for `count` cells.
    pub fn container(&self, count: usize) -> Rect {
        let columns = self.columns.max(1) as usize;
        let used_columns = count.clamp(1, columns) as f64;
        let rows = count.max(1).div_ceil(columns) as f64;
        let width = used_columns * self.cell_width + (used_columns - 1.0) * self.gap;
        let height = rows * self.cell_height + (rows - 1.0) * self.gap;
        Rect::new(
            0.0,
            0.0,
            width + 2.0 * self.padding,
            height + 2.0 * self.padding,
        )
    }

    /// Number of rows needed for `count` cells.
    pub fn rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns.max(1) as usize)
    }
}
