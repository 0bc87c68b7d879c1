//! Grid geometry and cell painting.

use crate::config::Palette;
use crate::decode::{CellPaint, DenseSnapshot};

use super::surface::{Rgba, Surface};

/// Pixel layout of the rendered grid.
///
/// Cells are `cell_size` squares separated by one-pixel gridlines, which sit
/// at every multiple of `cell_size + 1`. Lines and cell interiors never
/// overlap, and a `cols` x `rows` grid fills exactly
/// `(cell_size+1)*cols + 1` by `(cell_size+1)*rows + 1` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGeometry {
    cell_size: u32,
}

impl CellGeometry {
    /// # Panics
    ///
    /// Panics if `cell_size` is zero.
    pub fn new(cell_size: u32) -> Self {
        assert!(cell_size > 0, "cell size must be non-zero");
        Self { cell_size }
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Cell pitch: one cell plus one gridline.
    #[inline]
    pub fn span(&self) -> u32 {
        self.cell_size + 1
    }

    #[inline]
    pub fn surface_width(&self, cols: u32) -> u32 {
        self.span() * cols + 1
    }

    #[inline]
    pub fn surface_height(&self, rows: u32) -> u32 {
        self.span() * rows + 1
    }

    /// Top-left pixel of a cell's interior.
    #[inline]
    pub fn cell_origin(&self, row: u32, col: u32) -> (u32, u32) {
        (col * self.span() + 1, row * self.span() + 1)
    }
}

/// The surface handed to the renderer has the wrong pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("surface is {actual_width}x{actual_height} pixels but the grid needs {expected_width}x{expected_height}")]
pub struct SurfaceSizeMismatch {
    pub expected_width: u32,
    pub expected_height: u32,
    pub actual_width: u32,
    pub actual_height: u32,
}

/// Paints decoded cell state onto a [`Surface`].
///
/// Owns the surface for its lifetime; hosts read pixels back through
/// [`surface`](GridRenderer::surface) or reclaim it with
/// [`into_surface`](GridRenderer::into_surface).
#[derive(Debug)]
pub struct GridRenderer<S> {
    surface: S,
    width: u32,
    height: u32,
    geometry: CellGeometry,
    palette: Palette,
}

impl<S: Surface> GridRenderer<S> {
    /// Wrap a surface sized for a `width` x `height` cell grid.
    pub fn new(
        surface: S,
        width: u32,
        height: u32,
        geometry: CellGeometry,
        palette: Palette,
    ) -> Result<Self, SurfaceSizeMismatch> {
        let expected_width = geometry.surface_width(width);
        let expected_height = geometry.surface_height(height);
        if surface.width() != expected_width || surface.height() != expected_height {
            return Err(SurfaceSizeMismatch {
                expected_width,
                expected_height,
                actual_width: surface.width(),
                actual_height: surface.height(),
            });
        }
        Ok(Self {
            surface,
            width,
            height,
            geometry,
            palette,
        })
    }

    #[inline]
    pub fn grid_width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn grid_height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Redraw the full gridline overlay. Idempotent, and disjoint from cell
    /// interiors, so it never disturbs painted cells.
    pub fn draw_grid(&mut self) {
        let span = self.geometry.span();
        let surface_width = self.geometry.surface_width(self.width);
        let surface_height = self.geometry.surface_height(self.height);
        let grid = self.palette.grid;
        for i in 0..=self.width {
            self.surface.fill_rect(i * span, 0, 1, surface_height, grid);
        }
        for j in 0..=self.height {
            self.surface.fill_rect(0, j * span, surface_width, 1, grid);
        }
    }

    /// Paint every cell of a full snapshot, dead cells included.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot's grid does not match the renderer's.
    pub fn paint_full(&mut self, snapshot: &DenseSnapshot<'_>) {
        assert_eq!(
            (snapshot.width(), snapshot.height()),
            (self.width, self.height),
            "snapshot grid does not match renderer grid"
        );
        for cell in snapshot.cells() {
            let color = if cell.alive {
                self.palette.alive
            } else {
                self.palette.dead
            };
            self.fill_cell(cell.row, cell.col, color);
        }
    }

    /// Paint only the listed cells, leaving the rest untouched.
    ///
    /// Alive cells first, then dead, one fill color per pass.
    pub fn paint_changes(&mut self, changes: &[CellPaint]) {
        for alive in [true, false] {
            let color = if alive {
                self.palette.alive
            } else {
                self.palette.dead
            };
            for cell in changes.iter().filter(|cell| cell.alive == alive) {
                self.fill_cell(cell.row, cell.col, color);
            }
        }
    }

    fn fill_cell(&mut self, row: u32, col: u32, color: Rgba) {
        let (x, y) = self.geometry.cell_origin(row, col);
        let size = self.geometry.cell_size();
        self.surface.fill_rect(x, y, size, size, color);
    }
}
