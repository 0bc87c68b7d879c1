//! Pointer-to-cell mapping and host control events.

use crate::render::CellGeometry;

/// UI intents a host can feed the viewport, decoupled from any widget
/// toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Toggle between running and idle.
    PlayPause,
    /// Reroll the whole grid.
    Randomize,
    /// Kill the whole grid.
    Clear,
    /// Change the generations advanced per frame.
    StepRate(u32),
}

/// Maps pointer positions on the rendered surface back to grid cells.
///
/// A cell together with its leading gridline spans `cell_size + 1` pixels,
/// so integer division by the span recovers the cell index. Positions on the
/// far bottom or right gridline land one past the grid and clamp into the
/// last row or column.
#[derive(Debug, Clone, Copy)]
pub struct PointerMap {
    geometry: CellGeometry,
    width: u32,
    height: u32,
}

impl PointerMap {
    pub fn new(geometry: CellGeometry, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "pointer map needs a non-empty grid");
        Self {
            geometry,
            width,
            height,
        }
    }

    /// Cell under a position in surface pixels.
    pub fn cell_at(&self, x: f64, y: f64) -> (u32, u32) {
        let span = f64::from(self.geometry.span());
        let row = ((y / span).floor() as i64).clamp(0, i64::from(self.height) - 1) as u32;
        let col = ((x / span).floor() as i64).clamp(0, i64::from(self.width) - 1) as u32;
        (row, col)
    }

    /// Cell under a position in display pixels, for hosts that stretch the
    /// surface to a different on-screen size. `x` and `y` are relative to
    /// the display box's top-left corner.
    pub fn cell_at_scaled(&self, x: f64, y: f64, display_width: f64, display_height: f64) -> (u32, u32) {
        let scale_x = f64::from(self.geometry.surface_width(self.width)) / display_width;
        let scale_y = f64::from(self.geometry.surface_height(self.height)) / display_height;
        self.cell_at(x * scale_x, y * scale_y)
    }
}
