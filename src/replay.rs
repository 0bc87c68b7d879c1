//! A scripted engine for demos and integration tests.
//!
//! [`ReplayEngine`] walks a fixed list of frames instead of running a real
//! simulation, but it honors the full wire contract: cells live bit-packed
//! in a linear arena, sparse mode appends change records behind them, and an
//! unreleased change buffer keeps growing exactly as an engine-owned one
//! would.

use fixedbitset::FixedBitSet;

use crate::decode::encode_change;
use crate::engine::{CellPayload, Engine, WireMode};

/// Scripted engine over an in-process byte arena.
///
/// The arena is laid out as the wire contract expects:
///
/// ```text
///     0                cells                end
///     | packed cell bits | change records... |
/// ```
///
/// Every mutating call rewrites the arena, so a previously read slice is
/// stale the moment one runs. The script wraps around; with a single frame
/// the engine is static.
#[derive(Debug)]
pub struct ReplayEngine {
    width: u32,
    height: u32,
    current: FixedBitSet,
    script: Vec<FixedBitSet>,
    cursor: usize,
    changes: Vec<(u32, u32, bool)>,
    memory: Vec<u8>,
    wire: WireMode,
}

impl ReplayEngine {
    pub fn new(width: u32, height: u32, wire: WireMode) -> Self {
        assert!(width > 0 && height > 0, "grid must be non-empty");
        let cells = width as usize * height as usize;
        let mut engine = Self {
            width,
            height,
            current: FixedBitSet::with_capacity(cells),
            script: Vec::new(),
            cursor: 0,
            changes: Vec::new(),
            memory: Vec::new(),
            wire,
        };
        engine.rebuild_memory();
        engine
    }

    /// Append one scripted frame given as alive-cell coordinates. The first
    /// frame pushed also becomes the live state, and in sparse mode its
    /// alive cells land in the change buffer as the diff from the all-dead
    /// grid the engine started with.
    pub fn push_frame(&mut self, cells: &[(u32, u32)]) {
        let mut frame = FixedBitSet::with_capacity(self.cell_count());
        for &(row, col) in cells {
            assert!(
                row < self.height && col < self.width,
                "scripted cell ({row}, {col}) is outside the {}x{} grid",
                self.width,
                self.height
            );
            frame.insert(crate::decode::cell_index(row, col, self.width));
        }
        if self.script.is_empty() {
            for index in frame.ones() {
                let (row, col) = self.cell_coords(index);
                self.record(row, col, true);
            }
            self.current = frame.clone();
            self.cursor = 1;
        }
        self.script.push(frame);
        self.rebuild_memory();
    }

    pub fn wire(&self) -> WireMode {
        self.wire
    }

    #[inline]
    fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    fn cell_coords(&self, index: usize) -> (u32, u32) {
        (
            (index / self.width as usize) as u32,
            (index % self.width as usize) as u32,
        )
    }

    fn cells_byte_len(&self) -> usize {
        self.current.as_slice().len() * 4
    }

    fn record(&mut self, row: u32, col: u32, alive: bool) {
        if self.wire == WireMode::Sparse {
            self.changes.push((row, col, alive));
        }
    }

    fn rebuild_memory(&mut self) {
        self.memory.clear();
        self.memory
            .extend_from_slice(bytemuck::cast_slice(self.current.as_slice()));
        for &(row, col, alive) in &self.changes {
            self.memory.extend_from_slice(&encode_change(row, col, alive));
        }
    }
}

impl Engine for ReplayEngine {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tick(&mut self) {
        if self.script.is_empty() {
            return;
        }
        let at = self.cursor % self.script.len();
        let next = self.script[at].clone();
        for index in 0..self.cell_count() {
            let alive = next.contains(index);
            if self.current.contains(index) != alive {
                let (row, col) = self.cell_coords(index);
                self.record(row, col, alive);
            }
        }
        self.current = next;
        self.cursor = at + 1;
        self.rebuild_memory();
    }

    fn randomize(&mut self) {
        for index in 0..self.cell_count() {
            let alive = coin_flip();
            self.current.set(index, alive);
            let (row, col) = self.cell_coords(index);
            self.record(row, col, alive);
        }
        self.rebuild_memory();
    }

    fn clear(&mut self) {
        self.current.clear();
        for index in 0..self.cell_count() {
            let (row, col) = self.cell_coords(index);
            self.record(row, col, false);
        }
        self.rebuild_memory();
    }

    fn toggle_cell(&mut self, row: u32, col: u32) {
        let index = crate::decode::cell_index(row, col, self.width);
        let alive = !self.current.contains(index);
        self.current.set(index, alive);
        self.record(row, col, alive);
        self.rebuild_memory();
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn payload(&self) -> CellPayload {
        match self.wire {
            WireMode::Dense => CellPayload::Dense { offset: 0 },
            WireMode::Sparse => CellPayload::Sparse {
                offset: self.cells_byte_len(),
                count: self.changes.len() as u32,
            },
        }
    }

    fn release_changes(&mut self) {
        self.changes.clear();
        self.rebuild_memory();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn coin_flip() -> bool {
    use rand::Rng;

    rand::thread_rng().gen_bool(0.5)
}

#[cfg(target_arch = "wasm32")]
fn coin_flip() -> bool {
    js_sys::Math::random() < 0.5
}

/// The two phases of a blinker, anchored at the grid origin.
pub fn blinker_frames() -> [Vec<(u32, u32)>; 2] {
    [
        vec![(1, 0), (1, 1), (1, 2)],
        vec![(0, 1), (1, 1), (2, 1)],
    ]
}

/// The two phases of a beacon, anchored at the grid origin.
pub fn beacon_frames() -> [Vec<(u32, u32)>; 2] {
    [
        vec![
            (0, 0),
            (0, 1),
            (1, 0),
            (1, 1),
            (2, 2),
            (2, 3),
            (3, 2),
            (3, 3),
        ],
        vec![(0, 0), (0, 1), (1, 0), (2, 3), (3, 2), (3, 3)],
    ]
}
