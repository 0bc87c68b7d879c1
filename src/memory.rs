//! Bounds-checked reads over engine-owned memory.
//!
//! The simulation engine publishes its state as raw bytes in a linear memory
//! buffer it owns and mutates. [`MemoryView`] is the only way the rest of the
//! crate touches those bytes: a non-owning window at a byte offset, addressed
//! in fixed-size elements, with every read checked against the declared
//! window. The borrow ties the view to the engine's buffer, so a view can
//! never outlive the memory it reads, and re-acquiring a fresh view each
//! frame is what makes buffer reallocation between ticks safe.

/// A read was rejected because it fell outside the checked region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("read of {len} bytes at byte {at} is outside a {bound}-byte region")]
pub struct OutOfBounds {
    /// Byte position where the rejected access began.
    pub at: usize,
    /// Length of the rejected access in bytes.
    pub len: usize,
    /// Size of the region the access was checked against.
    pub bound: usize,
}

/// Read-only window into a foreign byte buffer.
///
/// Constructed from the whole buffer plus a byte offset, an element count,
/// and an element size (stride). The window is a plain subslice; nothing is
/// copied. Reads address elements, never raw buffer positions, and fail with
/// [`OutOfBounds`] instead of touching bytes past the declared length.
#[derive(Debug, Clone, Copy)]
pub struct MemoryView<'a> {
    window: &'a [u8],
    len: usize,
    stride: usize,
}

impl<'a> MemoryView<'a> {
    /// Create a view of `len` elements of `stride` bytes each, starting at
    /// `offset` into `buffer`.
    ///
    /// Fails with [`OutOfBounds`] when the window would overrun the buffer.
    ///
    /// # Panics
    ///
    /// Panics if `stride` is zero.
    pub fn new(
        buffer: &'a [u8],
        offset: usize,
        len: usize,
        stride: usize,
    ) -> Result<Self, OutOfBounds> {
        assert!(stride > 0, "element size must be at least one byte");
        let bytes = len.saturating_mul(stride);
        let end = offset.saturating_add(bytes);
        let window = buffer.get(offset..end).ok_or(OutOfBounds {
            at: offset,
            len: bytes,
            bound: buffer.len(),
        })?;
        Ok(Self {
            window,
            len,
            stride,
        })
    }

    /// Number of elements in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Window size in bytes (`len * stride`).
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.window.len()
    }

    /// Declared element size in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw window, for callers that have already proven their bounds.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.window
    }

    /// Resolve an in-window byte range for a read, or fail.
    fn span(&self, element: usize, byte: usize, len: usize) -> Result<usize, OutOfBounds> {
        let start = element.saturating_mul(self.stride).saturating_add(byte);
        if start.saturating_add(len) > self.window.len() {
            return Err(OutOfBounds {
                at: start,
                len,
                bound: self.window.len(),
            });
        }
        Ok(start)
    }

    /// Read a little-endian u32 at `byte` bytes into element `element`.
    pub fn read_u32_le(&self, element: usize, byte: usize) -> Result<u32, OutOfBounds> {
        let start = self.span(element, byte, 4)?;
        let b = &self.window[start..start + 4];
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a single byte at `byte` bytes into element `element`.
    pub fn read_byte(&self, element: usize, byte: usize) -> Result<u8, OutOfBounds> {
        let start = self.span(element, byte, 1)?;
        Ok(self.window[start])
    }

    /// Treat the window as a packed bitset and test one bit.
    ///
    /// Bit `i` lives in byte `i / 8` at mask `1 << (i % 8)`.
    pub fn test_bit(&self, index: usize) -> Result<bool, OutOfBounds> {
        let byte = index / 8;
        if byte >= self.window.len() {
            return Err(OutOfBounds {
                at: byte,
                len: 1,
                bound: self.window.len(),
            });
        }
        Ok(self.window[byte] & (1u8 << (index % 8)) != 0)
    }
}
