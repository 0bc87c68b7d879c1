//! The simulation engine seam.
//!
//! The engine is an external collaborator: it owns the simulation state, the
//! transition rule, and the linear memory the state lives in. This crate
//! only ever observes that memory through [`Engine::memory`] plus the offsets
//! in [`Engine::payload`], re-acquired fresh every frame. Rust's borrow rules
//! carry the validity window for free: holding the `&[u8]` from `memory`
//! blocks every mutating call, so no view can survive a tick.

/// Wire format an engine emits. Fixed per integration; an engine never
/// switches format mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMode {
    /// Full-grid bit snapshot every frame.
    Dense,
    /// Only the cells changed since the last read.
    Sparse,
}

/// Where the current frame's cell payload lives in engine memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPayload {
    /// Bit-packed full-grid snapshot at `offset`; length implied by the grid
    /// dimensions.
    Dense { offset: usize },
    /// `count` change records of the 12-byte wire layout at `offset`.
    Sparse { offset: usize, count: u32 },
}

impl CellPayload {
    pub fn mode(&self) -> WireMode {
        match self {
            CellPayload::Dense { .. } => WireMode::Dense,
            CellPayload::Sparse { .. } => WireMode::Sparse,
        }
    }
}

/// An external Game of Life engine.
///
/// Dimensions are immutable for the lifetime of an instance. Mutating calls
/// invalidate any previously read payload location. For sparse engines,
/// [`release_changes`](Engine::release_changes) must be called exactly once
/// per payload read, before the next `tick`; the engine owns the change
/// buffer and an unreleased one accumulates without bound.
pub trait Engine {
    /// Grid width in cells.
    fn width(&self) -> u32;

    /// Grid height in cells.
    fn height(&self) -> u32;

    /// Advance the simulation one generation.
    fn tick(&mut self);

    /// Reroll every cell at random.
    fn randomize(&mut self);

    /// Kill every cell.
    fn clear(&mut self);

    /// Flip one cell's state.
    fn toggle_cell(&mut self, row: u32, col: u32);

    /// The engine's linear memory.
    fn memory(&self) -> &[u8];

    /// Where the current frame's payload lives.
    fn payload(&self) -> CellPayload;

    /// Release the engine-owned change buffer after a sparse payload read.
    /// Dense engines keep the default no-op.
    fn release_changes(&mut self) {}
}
