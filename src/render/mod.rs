//! Render module - paint surfaces, grid geometry, and the cell renderer.

mod grid;
mod surface;

pub use grid::*;
pub use surface::*;
