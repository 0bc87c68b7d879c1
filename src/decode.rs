//! Wire-format decoding for grid cell state.
//!
//! Engines publish the cells in one of two layouts, fixed per integration:
//!
//! ```text
//! Dense snapshot (full grid):
//!   ceil(W*H/8) bytes, one bit per cell
//!   Cell (row, col) is bit row*W + col, row-major, LSB-first within a byte
//!
//! Sparse change list (cells changed since the last read):
//!   count * 12-byte records
//!     row:   u32 LE   (bytes 0..4)
//!     col:   u32 LE   (bytes 4..8)
//!     state: u8       (byte 8, nonzero = alive)
//!     pad:   3 bytes  (bytes 9..12)
//! ```
//!
//! Both decoders are pure functions of a [`MemoryView`]: restartable, no
//! side effects beyond the reads. Coordinates are validated against the grid
//! dimensions; an out-of-range coordinate is corrupt wire data, never
//! clamped.

use std::fmt;

use crate::memory::{MemoryView, OutOfBounds};

/// Size of one sparse change record in bytes.
pub const CHANGE_RECORD_BYTES: usize = 12;

const RECORD_ROW: usize = 0;
const RECORD_COL: usize = 4;
const RECORD_STATE: usize = 8;

/// Bytes needed for a dense snapshot of a `width` x `height` grid.
#[inline]
pub fn snapshot_len(width: u32, height: u32) -> usize {
    (width as usize * height as usize).div_ceil(8)
}

/// Row-major bit index of a cell.
#[inline]
pub fn cell_index(row: u32, col: u32, width: u32) -> usize {
    row as usize * width as usize + col as usize
}

/// One decoded paint instruction: a cell and the state to draw it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPaint {
    pub row: u32,
    pub col: u32,
    pub alive: bool,
}

/// Failure while interpreting wire bytes as grid state.
///
/// [`DecodeError::OutOfBounds`] means a read overran the declared window and
/// only the current frame is lost. The other variants mean the integration
/// itself is handing over corrupt data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
    /// The engine's out-of-band record count disagrees with the view.
    #[error("engine declared {declared} change records but the view holds {actual}")]
    RecordCountMismatch { declared: u32, actual: usize },
    /// A record names a cell outside the grid.
    #[error("change record names cell ({row}, {col}) outside a {width}x{height} grid")]
    CellOutOfRange {
        row: u32,
        col: u32,
        width: u32,
        height: u32,
    },
}

impl DecodeError {
    /// True for corrupt-integration errors, which pause playback rather than
    /// just dropping the frame.
    pub fn is_format(&self) -> bool {
        !matches!(self, DecodeError::OutOfBounds(_))
    }
}

/// Decoded view of a full-grid bit snapshot.
///
/// Construction proves that every cell's bit is readable; iteration and
/// [`get`](DenseSnapshot::get) are infallible afterwards. The underlying
/// bytes still belong to the engine, so a snapshot only lives as long as the
/// view it was built from.
#[derive(Debug, Clone, Copy)]
pub struct DenseSnapshot<'a> {
    bytes: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> DenseSnapshot<'a> {
    /// Wrap a view holding at least `ceil(width*height/8)` bytes.
    ///
    /// A shorter view fails with the same [`OutOfBounds`] the final cell's
    /// bit test would produce. Longer views are accepted; engines commonly
    /// pad the bitset out to word-sized blocks.
    pub fn new(view: MemoryView<'a>, width: u32, height: u32) -> Result<Self, DecodeError> {
        let total = width as usize * height as usize;
        if total > 0 {
            view.test_bit(total - 1)?;
        }
        Ok(Self {
            bytes: view.as_bytes(),
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// State of one cell.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, row: u32, col: u32) -> bool {
        assert!(row < self.height && col < self.width, "cell outside grid");
        let index = cell_index(row, col, self.width);
        self.bytes[index / 8] & (1u8 << (index % 8)) != 0
    }

    /// All cells in row-major order. Always yields exactly `width * height`
    /// instructions, dead cells included.
    pub fn cells(&self) -> Cells<'a> {
        Cells {
            snapshot: *self,
            index: 0,
            total: self.width as usize * self.height as usize,
        }
    }
}

/// Glyph rendering of the grid, one row per line.
impl fmt::Display for DenseSnapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let glyph = if self.get(row, col) { '◼' } else { '◻' };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Row-major iterator over every cell of a [`DenseSnapshot`].
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    snapshot: DenseSnapshot<'a>,
    index: usize,
    total: usize,
}

impl Iterator for Cells<'_> {
    type Item = CellPaint;

    fn next(&mut self) -> Option<CellPaint> {
        if self.index >= self.total {
            return None;
        }
        let width = self.snapshot.width;
        let row = (self.index / width as usize) as u32;
        let col = (self.index % width as usize) as u32;
        let alive = self.snapshot.bytes[self.index / 8] & (1u8 << (self.index % 8)) != 0;
        self.index += 1;
        Some(CellPaint { row, col, alive })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Cells<'_> {}

/// Build a dense snapshot straight from engine memory.
///
/// The snapshot length is implied by the grid dimensions; `offset` is where
/// the engine says the bitset starts.
pub fn dense_snapshot(
    memory: &[u8],
    offset: usize,
    width: u32,
    height: u32,
) -> Result<DenseSnapshot<'_>, DecodeError> {
    let view = MemoryView::new(memory, offset, snapshot_len(width, height), 1)?;
    DenseSnapshot::new(view, width, height)
}

/// Iterator over sparse change records.
///
/// Yields one [`CellPaint`] per record, validating each coordinate against
/// the grid as it goes. The record count the engine declared must match the
/// view exactly; that is checked once, up front.
#[derive(Debug, Clone)]
pub struct ChangeRecords<'a> {
    view: MemoryView<'a>,
    width: u32,
    height: u32,
    index: usize,
}

impl<'a> ChangeRecords<'a> {
    /// Wrap a view of 12-byte record elements.
    ///
    /// # Panics
    ///
    /// Panics if the view's element size is not [`CHANGE_RECORD_BYTES`].
    pub fn new(
        view: MemoryView<'a>,
        declared: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, DecodeError> {
        assert_eq!(
            view.stride(),
            CHANGE_RECORD_BYTES,
            "change views use 12-byte elements"
        );
        if declared as usize != view.len() {
            return Err(DecodeError::RecordCountMismatch {
                declared,
                actual: view.len(),
            });
        }
        Ok(Self {
            view,
            width,
            height,
            index: 0,
        })
    }

    fn read_record(&self, index: usize) -> Result<CellPaint, DecodeError> {
        let row = self.view.read_u32_le(index, RECORD_ROW)?;
        let col = self.view.read_u32_le(index, RECORD_COL)?;
        let state = self.view.read_byte(index, RECORD_STATE)?;
        if row >= self.height || col >= self.width {
            return Err(DecodeError::CellOutOfRange {
                row,
                col,
                width: self.width,
                height: self.height,
            });
        }
        Ok(CellPaint {
            row,
            col,
            alive: state != 0,
        })
    }
}

impl Iterator for ChangeRecords<'_> {
    type Item = Result<CellPaint, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.view.len() {
            return None;
        }
        let record = self.read_record(self.index);
        self.index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChangeRecords<'_> {}

/// Decode a change list from engine memory into `out`, replacing its
/// contents. `out` keeps its capacity across frames.
pub fn decode_changes(
    memory: &[u8],
    offset: usize,
    count: u32,
    width: u32,
    height: u32,
    out: &mut Vec<CellPaint>,
) -> Result<(), DecodeError> {
    out.clear();
    let view = MemoryView::new(memory, offset, count as usize, CHANGE_RECORD_BYTES)?;
    let records = ChangeRecords::new(view, count, width, height)?;
    out.reserve(records.len());
    for record in records {
        out.push(record?);
    }
    Ok(())
}

/// Encode one change record in the sparse wire layout.
pub fn encode_change(row: u32, col: u32, alive: bool) -> [u8; CHANGE_RECORD_BYTES] {
    let mut record = [0u8; CHANGE_RECORD_BYTES];
    record[RECORD_ROW..RECORD_ROW + 4].copy_from_slice(&row.to_le_bytes());
    record[RECORD_COL..RECORD_COL + 4].copy_from_slice(&col.to_le_bytes());
    record[RECORD_STATE] = alive as u8;
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bitset(width: u32, height: u32, alive: &[(u32, u32)]) -> Vec<u8> {
        let mut bytes = vec![0u8; snapshot_len(width, height)];
        for &(row, col) in alive {
            let index = cell_index(row, col, width);
            bytes[index / 8] |= 1 << (index % 8);
        }
        bytes
    }

    fn records(changes: &[(u32, u32, bool)]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(changes.len() * CHANGE_RECORD_BYTES);
        for &(row, col, alive) in changes {
            bytes.extend_from_slice(&encode_change(row, col, alive));
        }
        bytes
    }

    #[test]
    fn test_dense_yields_every_cell_row_major() {
        let bytes = bitset(3, 2, &[(0, 1), (1, 2)]);
        let snapshot = dense_snapshot(&bytes, 0, 3, 2).unwrap();
        let cells: Vec<CellPaint> = snapshot.cells().collect();
        assert_eq!(cells.len(), 6);
        let expected = [
            (0, 0, false),
            (0, 1, true),
            (0, 2, false),
            (1, 0, false),
            (1, 1, false),
            (1, 2, true),
        ];
        for (cell, &(row, col, alive)) in cells.iter().zip(expected.iter()) {
            assert_eq!(*cell, CellPaint { row, col, alive });
        }
    }

    #[test]
    fn test_dense_short_view_is_out_of_bounds() {
        // 6x6 needs 5 bytes.
        let bytes = [0u8; 4];
        let err = dense_snapshot(&bytes, 0, 6, 6).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfBounds(_)));
        assert!(!err.is_format());
    }

    #[test]
    fn test_dense_tolerates_word_padding() {
        // 6x6 needs 5 bytes; a block-aligned engine hands over 8.
        let mut bytes = vec![0u8; 8];
        let index = cell_index(5, 5, 6);
        bytes[index / 8] |= 1 << (index % 8);
        let snapshot = dense_snapshot(&bytes, 0, 6, 6).unwrap();
        assert!(snapshot.get(5, 5));
        assert_eq!(snapshot.cells().count(), 36);
    }

    #[test]
    fn test_dense_display_glyphs() {
        let bytes = bitset(3, 1, &[(0, 1)]);
        let snapshot = dense_snapshot(&bytes, 0, 3, 1).unwrap();
        assert_eq!(snapshot.to_string(), "◻◼◻\n");
    }

    #[test]
    fn test_sparse_roundtrip() {
        let bytes = records(&[(3, 4, true), (5, 5, false)]);
        let mut out = Vec::new();
        decode_changes(&bytes, 0, 2, 8, 8, &mut out).unwrap();
        assert_eq!(
            out,
            vec![
                CellPaint {
                    row: 3,
                    col: 4,
                    alive: true
                },
                CellPaint {
                    row: 5,
                    col: 5,
                    alive: false
                },
            ]
        );
    }

    #[test]
    fn test_sparse_count_mismatch_is_format_error() {
        let bytes = records(&[(0, 0, true), (1, 1, false)]);
        let view = MemoryView::new(&bytes, 0, 2, CHANGE_RECORD_BYTES).unwrap();
        let err = ChangeRecords::new(view, 3, 8, 8).unwrap_err();
        assert_eq!(
            err,
            DecodeError::RecordCountMismatch {
                declared: 3,
                actual: 2
            }
        );
        assert!(err.is_format());
    }

    #[test]
    fn test_sparse_count_overrunning_memory_is_out_of_bounds() {
        let bytes = records(&[(0, 0, true)]);
        let mut out = Vec::new();
        let err = decode_changes(&bytes, 0, 2, 8, 8, &mut out).unwrap_err();
        assert!(matches!(err, DecodeError::OutOfBounds(_)));
    }

    #[test]
    fn test_sparse_rejects_out_of_range_coordinate() {
        let bytes = records(&[(1, 1, true), (2, 9, true)]);
        let mut out = Vec::new();
        let err = decode_changes(&bytes, 0, 2, 8, 8, &mut out).unwrap_err();
        assert_eq!(
            err,
            DecodeError::CellOutOfRange {
                row: 2,
                col: 9,
                width: 8,
                height: 8
            }
        );
        assert!(err.is_format());
    }

    #[test]
    fn test_sparse_state_byte_nonzero_is_alive() {
        let mut bytes = records(&[(0, 0, true)]);
        bytes[RECORD_STATE] = 7;
        let mut out = Vec::new();
        decode_changes(&bytes, 0, 1, 4, 4, &mut out).unwrap();
        assert!(out[0].alive);
    }

    #[test]
    fn test_sparse_records_at_offset() {
        let mut bytes = vec![0xEEu8; 5];
        bytes.extend_from_slice(&records(&[(2, 3, true)]));
        let mut out = Vec::new();
        decode_changes(&bytes, 5, 1, 4, 4, &mut out).unwrap();
        assert_eq!(
            out,
            vec![CellPaint {
                row: 2,
                col: 3,
                alive: true
            }]
        );
    }

    #[test]
    fn test_decode_replaces_previous_contents() {
        let bytes = records(&[(1, 0, true)]);
        let mut out = vec![
            CellPaint {
                row: 9,
                col: 9,
                alive: false,
            };
            4
        ];
        decode_changes(&bytes, 0, 1, 4, 4, &mut out).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].row, 1);
    }

    proptest! {
        #[test]
        fn prop_dense_get_matches_source_bit(
            width in 1u32..48,
            height in 1u32..48,
            seed in any::<u64>(),
        ) {
            // Fill deterministically from the seed.
            let mut bytes = vec![0u8; snapshot_len(width, height)];
            let mut state = seed | 1;
            for b in bytes.iter_mut() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                *b = (state >> 33) as u8;
            }
            let snapshot = dense_snapshot(&bytes, 0, width, height).unwrap();
            let mut cells = snapshot.cells();
            for row in 0..height {
                for col in 0..width {
                    let index = cell_index(row, col, width);
                    prop_assert_eq!(index, row as usize * width as usize + col as usize);
                    let expected = bytes[index / 8] & (1 << (index % 8)) != 0;
                    prop_assert_eq!(snapshot.get(row, col), expected);
                    let next = cells.next().unwrap();
                    prop_assert_eq!(next, CellPaint { row, col, alive: expected });
                }
            }
            prop_assert!(cells.next().is_none());
        }
    }
}
